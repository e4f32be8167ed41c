use core::cell::Cell;

use crate::{
    civil::{check_timestamp, cycle},
    error::Error,
};

/// A view of a timestamp in the civil Gregorian calendar.
///
/// A `GregorianDate` is computed from a millisecond timestamp in constant
/// time via nested leap cycle decomposition. The year, its leap flag and
/// the timestamp at which the year begins are computed eagerly. The
/// ordinal day, month and day of the month are pure functions of
/// `timestamp - year_start_timestamp` and are derived on first access,
/// then cached.
///
/// # Immutability
///
/// Values of this type are immutable. Every `with_*` setter returns a new
/// value whose timestamp has been shifted by the exact delta between the
/// old and the new field. The derived-field cache is the one exception:
/// populating it is invisible to every observer, since recomputation is
/// referentially transparent. Equality, ordering and hashing look only at
/// the timestamp.
///
/// # Example
///
/// ```
/// use timeform::civil::GregorianDate;
///
/// let date = GregorianDate::from_timestamp(1_104_537_600_000)?; // 2005-01-01
/// assert_eq!(date.year(), 2005);
/// assert_eq!(date.month(), 1);
/// assert_eq!(date.day(), 1);
/// assert_eq!(date.ordinal_day(), 1);
/// assert!(!date.in_leap_year());
///
/// # Ok::<(), timeform::Error>(())
/// ```
#[derive(Clone)]
pub struct GregorianDate {
    timestamp: i64,
    year: i16,
    leap: bool,
    year_start: i64,
    ordinal: Cell<Option<i16>>,
    month_day: Cell<Option<(i8, i8)>>,
}

impl GregorianDate {
    /// Creates a Gregorian calendar view of the given timestamp
    /// (milliseconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// This returns an error when the timestamp is outside the supported
    /// range of years 1 through 9999.
    pub fn from_timestamp(timestamp: i64) -> Result<GregorianDate, Error> {
        let timestamp = check_timestamp(timestamp)?;
        let info = cycle::gregorian_year_of(timestamp);
        Ok(GregorianDate {
            timestamp,
            year: info.year,
            leap: info.leap,
            year_start: info.start,
            ordinal: Cell::new(None),
            month_day: Cell::new(None),
        })
    }

    /// Returns the timestamp this view was computed from.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the year, in the range `1..=9999`.
    pub fn year(&self) -> i16 {
        self.year
    }

    /// Returns true if and only if this date's year is a leap year.
    pub fn in_leap_year(&self) -> bool {
        self.leap
    }

    /// Returns the timestamp at which this date's year begins.
    pub fn year_start_timestamp(&self) -> i64 {
        self.year_start
    }

    /// Returns the day of the year, in the range `1..=366`.
    ///
    /// Derived from the year offset on first access and cached; reading it
    /// twice yields identical results and changes nothing observable.
    pub fn ordinal_day(&self) -> i16 {
        if let Some(ordinal) = self.ordinal.get() {
            return ordinal;
        }
        let days = (self.timestamp - self.year_start) / cycle::MS_PER_DAY;
        let ordinal = (days + 1) as i16;
        self.ordinal.set(Some(ordinal));
        ordinal
    }

    /// Returns the month, in the range `1..=12`.
    pub fn month(&self) -> i8 {
        self.month_day().0
    }

    /// Returns the day of the month, in the range `1..=31`.
    pub fn day(&self) -> i8 {
        self.month_day().1
    }

    fn month_day(&self) -> (i8, i8) {
        if let Some(month_day) = self.month_day.get() {
            return month_day;
        }
        let month_day =
            cycle::month_day_of_ordinal(self.leap, self.ordinal_day());
        self.month_day.set(Some(month_day));
        month_day
    }

    /// Returns a new date with the given year, preserving the day of the
    /// year and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `year` is outside `1..=9999`, or when
    /// this date's ordinal day does not exist in the target year (the
    /// 366th day moving onto a common year).
    pub fn with_year(&self, year: i16) -> Result<GregorianDate, Error> {
        if !(1..=9999).contains(&year) {
            return Err(Error::range("year", year, 1, 9999));
        }
        let ordinal = self.ordinal_day();
        let max = cycle::days_in_year(year);
        if ordinal > max {
            return Err(Error::range("day of year", ordinal, 1, max));
        }
        let delta = cycle::gregorian_year_start(year) - self.year_start;
        GregorianDate::from_timestamp(self.timestamp + delta)
    }

    /// Returns a new date with the given month, preserving the day of the
    /// month and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `month` is outside `1..=12`, or when
    /// this date's day of the month does not exist in the target month.
    pub fn with_month(&self, month: i8) -> Result<GregorianDate, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::range("month", month, 1, 12));
        }
        let (_, day) = self.month_day();
        let max = cycle::days_in_month(self.year, month);
        if day > max {
            return Err(Error::range("day", day, 1, max));
        }
        let ordinal = cycle::ordinal_of_month_day(self.leap, month, day);
        let delta =
            i64::from(ordinal - self.ordinal_day()) * cycle::MS_PER_DAY;
        GregorianDate::from_timestamp(self.timestamp + delta)
    }

    /// Returns a new date with the given day of the month, preserving the
    /// month and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `day` does not exist in this date's
    /// month.
    pub fn with_day(&self, day: i8) -> Result<GregorianDate, Error> {
        let (month, old_day) = self.month_day();
        let max = cycle::days_in_month(self.year, month);
        if !(1..=max).contains(&day) {
            return Err(Error::range("day", day, 1, max));
        }
        let delta = i64::from(day - old_day) * cycle::MS_PER_DAY;
        GregorianDate::from_timestamp(self.timestamp + delta)
    }

    /// Returns a new date with the given day of the year, preserving the
    /// year and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `ordinal` does not exist in this date's
    /// year.
    pub fn with_ordinal_day(
        &self,
        ordinal: i16,
    ) -> Result<GregorianDate, Error> {
        let max = cycle::days_in_year(self.year);
        if !(1..=max).contains(&ordinal) {
            return Err(Error::range("day of year", ordinal, 1, max));
        }
        let delta =
            i64::from(ordinal - self.ordinal_day()) * cycle::MS_PER_DAY;
        GregorianDate::from_timestamp(self.timestamp + delta)
    }
}

impl Eq for GregorianDate {}

impl PartialEq for GregorianDate {
    fn eq(&self, other: &GregorianDate) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Ord for GregorianDate {
    fn cmp(&self, other: &GregorianDate) -> core::cmp::Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl PartialOrd for GregorianDate {
    fn partial_cmp(
        &self,
        other: &GregorianDate,
    ) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for GregorianDate {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
    }
}

impl core::fmt::Debug for GregorianDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "GregorianDate({:04}-{:02}-{:02})",
            self.year(),
            self.month(),
            self.day(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(t: i64) -> GregorianDate {
        GregorianDate::from_timestamp(t).unwrap()
    }

    #[test]
    fn epoch() {
        let d = date(0);
        assert_eq!(d.year(), 1970);
        assert_eq!((d.month(), d.day()), (1, 1));
        assert_eq!(d.ordinal_day(), 1);
        assert!(!d.in_leap_year());
        assert_eq!(d.year_start_timestamp(), 0);
    }

    #[test]
    fn derived_fields_are_idempotent() {
        // 2024-02-29T12:00:00Z
        let d = date(1_709_208_000_000);
        assert_eq!(d.ordinal_day(), 60);
        assert_eq!(d.ordinal_day(), 60);
        assert_eq!((d.month(), d.day()), (2, 29));
        assert_eq!((d.month(), d.day()), (2, 29));
        assert_eq!(d.year(), 2024);
        assert!(d.in_leap_year());
    }

    #[test]
    fn cache_does_not_affect_identity() {
        let t = 1_709_208_000_000;
        let fresh = date(t);
        let probed = date(t);
        probed.ordinal_day();
        probed.month();
        assert_eq!(fresh, probed);
    }

    #[test]
    fn setters_preserve_time_of_day() {
        // 2024-03-10T04:30:00Z
        let d = date(1_710_045_000_000);
        assert_eq!((d.year(), d.month(), d.day()), (2024, 3, 10));

        let d2 = d.with_day(11).unwrap();
        assert_eq!((d2.year(), d2.month(), d2.day()), (2024, 3, 11));
        assert_eq!(d2.timestamp() - d.timestamp(), 86_400_000);

        let d3 = d.with_month(1).unwrap();
        assert_eq!((d3.month(), d3.day()), (1, 10));

        let d4 = d.with_ordinal_day(1).unwrap();
        assert_eq!((d4.month(), d4.day()), (1, 1));
    }

    #[test]
    fn setter_range_violations() {
        // 2024-02-29T00:00:00Z
        let d = date(1_709_164_800_000);
        // Feb 29 does not exist in 2025.
        let err = d.with_year(2025).unwrap_err();
        assert!(err.is_range());
        // ...but the 60th ordinal day of 2025 does (March 1).
        let d2 = d.with_year(2028).unwrap();
        assert_eq!((d2.year(), d2.month(), d2.day()), (2028, 2, 29));

        assert!(d.with_month(13).is_err());
        assert!(d.with_day(32).is_err());
        assert!(d.with_ordinal_day(367).is_err());
        // 2024-01-31 cannot move to February wholesale.
        let jan31 = date(1_706_659_200_000);
        assert_eq!((jan31.month(), jan31.day()), (1, 31));
        assert!(jan31.with_month(2).is_err());
    }

    /// Maps an arbitrary seed onto a supported timestamp.
    fn arbitrary_timestamp(seed: u64) -> i64 {
        use crate::civil::{TIMESTAMP_MAX, TIMESTAMP_MIN};
        let span = (TIMESTAMP_MAX - TIMESTAMP_MIN) as u64 + 1;
        TIMESTAMP_MIN + (seed % span) as i64
    }

    quickcheck::quickcheck! {
        fn prop_ordinal_day_roundtrip(seed: u64) -> bool {
            let d = date(arbitrary_timestamp(seed));
            let back = d.with_ordinal_day(d.ordinal_day()).unwrap();
            back == d
        }

        fn prop_month_day_consistent(seed: u64) -> bool {
            let d = date(arbitrary_timestamp(seed));
            let expected = crate::civil::cycle::ordinal_of_month_day(
                d.in_leap_year(),
                d.month(),
                d.day(),
            );
            expected == d.ordinal_day()
        }
    }
}
