use core::cell::Cell;

use crate::{
    civil::{check_timestamp, cycle, Weekday},
    error::Error,
};

/// A view of a timestamp in the ISO week-numbering calendar.
///
/// In this calendar, weeks run Monday through Sunday and the first week of
/// a year is the one containing January 4th. A "long" year has 53 weeks;
/// short years have 52. Whether a year is long follows from the weekday
/// its Gregorian counterpart starts on, which means the ISO year boundary
/// can sit up to three days on either side of January 1st.
///
/// The ISO year, its long flag and the year start timestamp are computed
/// eagerly through the ISO cycle decomposition (which is independent of
/// the Gregorian one). The week and weekday are derived on first access
/// and cached, like the derived fields on
/// [`GregorianDate`](crate::civil::GregorianDate).
///
/// # Example
///
/// ```
/// use timeform::civil::{IsoDate, Weekday};
///
/// // 2005-01-01 is a Saturday in week 53 of ISO year 2004.
/// let date = IsoDate::from_timestamp(1_104_537_600_000)?;
/// assert_eq!(date.year(), 2004);
/// assert_eq!(date.iso_week(), 53);
/// assert_eq!(date.weekday(), Weekday::Saturday);
/// assert!(date.in_long_year());
///
/// # Ok::<(), timeform::Error>(())
/// ```
#[derive(Clone)]
pub struct IsoDate {
    timestamp: i64,
    year: i16,
    long: bool,
    year_start: i64,
    week: Cell<Option<i8>>,
    weekday: Cell<Option<Weekday>>,
}

impl IsoDate {
    /// Creates an ISO week calendar view of the given timestamp
    /// (milliseconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// This returns an error when the timestamp is outside the supported
    /// range of years 1 through 9999.
    pub fn from_timestamp(timestamp: i64) -> Result<IsoDate, Error> {
        let timestamp = check_timestamp(timestamp)?;
        let info = cycle::iso_year_of(timestamp);
        Ok(IsoDate {
            timestamp,
            year: info.year,
            long: info.long,
            year_start: info.start,
            week: Cell::new(None),
            weekday: Cell::new(None),
        })
    }

    /// Returns the timestamp this view was computed from.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the ISO week-numbering year.
    pub fn year(&self) -> i16 {
        self.year
    }

    /// Returns true if and only if this date's ISO year has 53 weeks.
    pub fn in_long_year(&self) -> bool {
        self.long
    }

    /// Returns the number of weeks in this date's ISO year.
    pub fn weeks_in_year(&self) -> i8 {
        if self.long {
            53
        } else {
            52
        }
    }

    /// Returns the timestamp at which this date's ISO year begins (always
    /// a Monday).
    pub fn year_start_timestamp(&self) -> i64 {
        self.year_start
    }

    /// Returns the ISO week number, in the range `1..=53`.
    ///
    /// Derived from the year offset on first access and cached.
    pub fn iso_week(&self) -> i8 {
        if let Some(week) = self.week.get() {
            return week;
        }
        let weeks = (self.timestamp - self.year_start) / cycle::MS_PER_WEEK;
        let week = (weeks + 1) as i8;
        self.week.set(Some(week));
        week
    }

    /// Returns the weekday.
    ///
    /// Derived on first access and cached.
    pub fn weekday(&self) -> Weekday {
        if let Some(weekday) = self.weekday.get() {
            return weekday;
        }
        // OK because `cycle::weekday_of` always returns 0..=6.
        let weekday =
            Weekday::from_monday_zero_offset(cycle::weekday_of(self.timestamp))
                .unwrap();
        self.weekday.set(Some(weekday));
        weekday
    }

    /// Returns a new date with the given ISO year, preserving the week,
    /// the weekday and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `year` is outside `1..=9999`, or when
    /// this date sits in week 53 and the target year is short.
    pub fn with_year(&self, year: i16) -> Result<IsoDate, Error> {
        if !(1..=9999).contains(&year) {
            return Err(Error::range("ISO year", year, 1, 9999));
        }
        let week = self.iso_week();
        let max = if cycle::iso_year_is_long(year) { 53 } else { 52 };
        if week > max {
            return Err(Error::range("ISO week", week, 1, max));
        }
        let delta = cycle::iso_year_start(year) - self.year_start;
        IsoDate::from_timestamp(self.timestamp + delta)
    }

    /// Returns a new date with the given ISO week, preserving the year,
    /// the weekday and the time of day.
    ///
    /// # Errors
    ///
    /// This returns an error when `week` is out of range for this date's
    /// year. Week 53 exists only in long years.
    pub fn with_iso_week(&self, week: i8) -> Result<IsoDate, Error> {
        let max = self.weeks_in_year();
        if !(1..=max).contains(&week) {
            return Err(Error::range("ISO week", week, 1, max));
        }
        let delta =
            i64::from(week - self.iso_week()) * cycle::MS_PER_WEEK;
        IsoDate::from_timestamp(self.timestamp + delta)
    }

    /// Returns a new date with the given weekday, preserving the year,
    /// the week and the time of day.
    pub fn with_weekday(&self, weekday: Weekday) -> Result<IsoDate, Error> {
        let old = self.weekday().to_monday_zero_offset();
        let new = weekday.to_monday_zero_offset();
        let delta = i64::from(new - old) * cycle::MS_PER_DAY;
        IsoDate::from_timestamp(self.timestamp + delta)
    }
}

impl Eq for IsoDate {}

impl PartialEq for IsoDate {
    fn eq(&self, other: &IsoDate) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Ord for IsoDate {
    fn cmp(&self, other: &IsoDate) -> core::cmp::Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl PartialOrd for IsoDate {
    fn partial_cmp(&self, other: &IsoDate) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for IsoDate {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
    }
}

impl core::fmt::Debug for IsoDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "IsoDate({:04}-W{:02}-{})",
            self.year(),
            self.iso_week(),
            self.weekday().to_monday_one_offset(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(t: i64) -> IsoDate {
        IsoDate::from_timestamp(t).unwrap()
    }

    #[test]
    fn famous_week_53() {
        // 2005-01-01 -> 2004-W53-6.
        let d = date(1_104_537_600_000);
        assert_eq!(d.year(), 2004);
        assert_eq!(d.iso_week(), 53);
        assert_eq!(d.weekday(), Weekday::Saturday);
        // 2008-12-29 -> 2009-W01-1.
        let d = date(1_230_508_800_000);
        assert_eq!(d.year(), 2009);
        assert_eq!(d.iso_week(), 1);
        assert_eq!(d.weekday(), Weekday::Monday);
        // 2010-01-03 -> 2009-W53-7.
        let d = date(1_262_476_800_000);
        assert_eq!(d.year(), 2009);
        assert_eq!(d.iso_week(), 53);
        assert_eq!(d.weekday(), Weekday::Sunday);
    }

    #[test]
    fn week_53_requires_long_year() {
        // 2004-W01-1 (Monday 2003-12-29).
        let d = date(1_072_656_000_000);
        assert_eq!((d.year(), d.iso_week()), (2004, 1));
        assert!(d.in_long_year());

        // 2004 is long, so week 53 exists and round-trips.
        let w53 = d.with_iso_week(53).unwrap();
        assert_eq!(w53.iso_week(), 53);
        assert_eq!(w53.year(), 2004);
        assert_eq!(w53.weekday(), d.weekday());

        // 2005 is short: moving week 53 onto it must fail...
        let err = w53.with_year(2005).unwrap_err();
        assert!(err.is_range());
        assert_eq!(
            err.to_string(),
            "parameter 'ISO week' with value 53 \
             is not in the required range of 1..=52",
        );
        // ...and so must setting week 53 within a short year.
        let d2005 = d.with_year(2005).unwrap();
        assert!(d2005.with_iso_week(53).is_err());
        assert!(d2005.with_iso_week(52).is_ok());
    }

    #[test]
    fn setters_preserve_other_fields() {
        // 2004-W27-4 with some time of day: Thursday 2004-07-01T10:30Z.
        let d = date(1_088_677_800_000);
        assert_eq!(d.year(), 2004);
        assert_eq!(d.weekday(), Weekday::Thursday);

        let d2 = d.with_weekday(Weekday::Monday).unwrap();
        assert_eq!(d2.iso_week(), d.iso_week());
        assert_eq!(d2.year(), d.year());
        assert_eq!(d.timestamp() - d2.timestamp(), 3 * 86_400_000);

        let d3 = d.with_iso_week(1).unwrap();
        assert_eq!(d3.weekday(), Weekday::Thursday);
        assert_eq!(d3.year(), 2004);
    }

    #[test]
    fn derived_fields_are_idempotent() {
        let d = date(1_104_537_600_000);
        assert_eq!(d.iso_week(), 53);
        assert_eq!(d.iso_week(), 53);
        assert_eq!(d.weekday(), Weekday::Saturday);
        assert_eq!(d.weekday(), Weekday::Saturday);
        assert_eq!(d.year(), 2004);
    }

    fn arbitrary_timestamp(seed: u64) -> i64 {
        use crate::civil::{TIMESTAMP_MAX, TIMESTAMP_MIN};
        let span = (TIMESTAMP_MAX - TIMESTAMP_MIN) as u64 + 1;
        TIMESTAMP_MIN + (seed % span) as i64
    }

    quickcheck::quickcheck! {
        fn prop_week_weekday_roundtrip(seed: u64) -> bool {
            let d = date(arbitrary_timestamp(seed));
            let back = d
                .with_iso_week(d.iso_week())
                .unwrap()
                .with_weekday(d.weekday())
                .unwrap();
            back == d
        }

        fn prop_week_in_bounds(seed: u64) -> bool {
            let d = date(arbitrary_timestamp(seed));
            1 <= d.iso_week() && d.iso_week() <= d.weeks_in_year()
        }
    }
}
