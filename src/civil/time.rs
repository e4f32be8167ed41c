use crate::{
    civil::{check_timestamp, cycle},
    error::Error,
};

/// Whether a clock time falls in the first or second half of the day.
///
/// The numeric value of a meridiem is the hour offset it contributes to a
/// 24 hour clock: `0` for AM, `12` for PM.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Returns the hour offset of this meridiem on a 24 hour clock: `0`
    /// for AM and `12` for PM.
    pub fn hour_offset(self) -> i8 {
        match self {
            Meridiem::Am => 0,
            Meridiem::Pm => 12,
        }
    }

    /// Converts an hour offset (`0` or `12`) into a meridiem.
    pub fn from_hour_offset(offset: i8) -> Result<Meridiem, Error> {
        match offset {
            0 => Ok(Meridiem::Am),
            12 => Ok(Meridiem::Pm),
            _ => Err(err!(
                "parameter 'meridiem' with value {offset} \
                 must be either 0 (AM) or 12 (PM)",
            )),
        }
    }

    /// Returns the meridiem of an hour on a 24 hour clock.
    pub fn from_hour23(hour: i8) -> Meridiem {
        if hour < 12 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }
}

/// A representation of civil "wall clock" time within one day.
///
/// A `Time` corresponds to a single millisecond in the range
/// `[0, 86_400_000)`. All of its fields are computed eagerly and are
/// mutually consistent: the 12 hour clock fields always satisfy
/// `hour23 == meridiem.hour_offset() + hour11`.
///
/// # Example
///
/// ```
/// use timeform::civil::{Meridiem, Time};
///
/// let t = Time::from_timestamp(1_104_616_452_543)?; // ...T21:54:12.543Z
/// assert_eq!(t.hour23(), 21);
/// assert_eq!(t.hour11(), 9);
/// assert_eq!(t.meridiem(), Meridiem::Pm);
/// assert_eq!(t.minute(), 54);
/// assert_eq!(t.second(), 12);
/// assert_eq!(t.millisecond(), 543);
///
/// # Ok::<(), timeform::Error>(())
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Time {
    day_offset: i32,
    hour23: i8,
    hour11: i8,
    meridiem: Meridiem,
    minute: i8,
    second: i8,
    millisecond: i16,
}

impl Time {
    /// Midnight.
    pub const MIDNIGHT: Time = Time {
        day_offset: 0,
        hour23: 0,
        hour11: 0,
        meridiem: Meridiem::Am,
        minute: 0,
        second: 0,
        millisecond: 0,
    };

    /// Creates the clock time of the given timestamp (milliseconds since
    /// the Unix epoch).
    ///
    /// # Errors
    ///
    /// This returns an error when the timestamp is outside the supported
    /// range.
    pub fn from_timestamp(timestamp: i64) -> Result<Time, Error> {
        let timestamp = check_timestamp(timestamp)?;
        Ok(Time::from_day_offset(cycle::time_of_day(timestamp) as i32))
    }

    /// Creates a clock time from a millisecond offset into the civil day.
    /// The offset must be in `0..86_400_000`; callers in this crate
    /// guarantee that by reducing timestamps modulo one day.
    pub(crate) fn from_day_offset(day_offset: i32) -> Time {
        debug_assert!((0..86_400_000).contains(&day_offset));
        let hour23 = (day_offset / cycle::MS_PER_HOUR as i32) as i8;
        let minute = (day_offset / cycle::MS_PER_MINUTE as i32 % 60) as i8;
        let second = (day_offset / cycle::MS_PER_SECOND as i32 % 60) as i8;
        let millisecond = (day_offset % cycle::MS_PER_SECOND as i32) as i16;
        Time {
            day_offset,
            hour23,
            hour11: hour23 % 12,
            meridiem: Meridiem::from_hour23(hour23),
            minute,
            second,
            millisecond,
        }
    }

    /// Creates a clock time from its 24 hour fields.
    ///
    /// # Errors
    ///
    /// This returns an error when any field is out of range.
    pub fn new(
        hour23: i8,
        minute: i8,
        second: i8,
        millisecond: i16,
    ) -> Result<Time, Error> {
        if !(0..=23).contains(&hour23) {
            return Err(Error::range("hour", hour23, 0, 23));
        }
        if !(0..=59).contains(&minute) {
            return Err(Error::range("minute", minute, 0, 59));
        }
        if !(0..=59).contains(&second) {
            return Err(Error::range("second", second, 0, 59));
        }
        if !(0..=999).contains(&millisecond) {
            return Err(Error::range("millisecond", millisecond, 0, 999));
        }
        let day_offset = i32::from(hour23) * cycle::MS_PER_HOUR as i32
            + i32::from(minute) * cycle::MS_PER_MINUTE as i32
            + i32::from(second) * cycle::MS_PER_SECOND as i32
            + i32::from(millisecond);
        Ok(Time::from_day_offset(day_offset))
    }

    /// Returns the millisecond offset of this time within its civil day,
    /// in the range `[0, 86_400_000)`.
    pub fn day_offset(&self) -> i32 {
        self.day_offset
    }

    /// Returns the hour on a 24 hour clock, in the range `0..=23`.
    pub fn hour23(&self) -> i8 {
        self.hour23
    }

    /// Returns the hour on a 12 hour clock, in the range `0..=11`.
    pub fn hour11(&self) -> i8 {
        self.hour11
    }

    /// Returns the meridiem.
    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Returns the minute, in the range `0..=59`.
    pub fn minute(&self) -> i8 {
        self.minute
    }

    /// Returns the second, in the range `0..=59`.
    pub fn second(&self) -> i8 {
        self.second
    }

    /// Returns the millisecond, in the range `0..=999`.
    pub fn millisecond(&self) -> i16 {
        self.millisecond
    }

    /// Returns a new time with the given 24 hour clock hour.
    pub fn with_hour23(&self, hour23: i8) -> Result<Time, Error> {
        if !(0..=23).contains(&hour23) {
            return Err(Error::range("hour", hour23, 0, 23));
        }
        let delta =
            i32::from(hour23 - self.hour23) * cycle::MS_PER_HOUR as i32;
        Ok(Time::from_day_offset(self.day_offset + delta))
    }

    /// Returns a new time with the given 12 hour clock hour, keeping the
    /// meridiem.
    pub fn with_hour11(&self, hour11: i8) -> Result<Time, Error> {
        if !(0..=11).contains(&hour11) {
            return Err(Error::range("hour (12 hour clock)", hour11, 0, 11));
        }
        self.with_hour23(self.meridiem.hour_offset() + hour11)
    }

    /// Returns a new time with the given meridiem, keeping the 12 hour
    /// clock hour.
    pub fn with_meridiem(&self, meridiem: Meridiem) -> Result<Time, Error> {
        self.with_hour23(meridiem.hour_offset() + self.hour11)
    }

    /// Returns a new time with the given minute.
    pub fn with_minute(&self, minute: i8) -> Result<Time, Error> {
        if !(0..=59).contains(&minute) {
            return Err(Error::range("minute", minute, 0, 59));
        }
        let delta =
            i32::from(minute - self.minute) * cycle::MS_PER_MINUTE as i32;
        Ok(Time::from_day_offset(self.day_offset + delta))
    }

    /// Returns a new time with the given second.
    pub fn with_second(&self, second: i8) -> Result<Time, Error> {
        if !(0..=59).contains(&second) {
            return Err(Error::range("second", second, 0, 59));
        }
        let delta =
            i32::from(second - self.second) * cycle::MS_PER_SECOND as i32;
        Ok(Time::from_day_offset(self.day_offset + delta))
    }

    /// Returns a new time with the given millisecond.
    pub fn with_millisecond(&self, millisecond: i16) -> Result<Time, Error> {
        if !(0..=999).contains(&millisecond) {
            return Err(Error::range("millisecond", millisecond, 0, 999));
        }
        let delta = i32::from(millisecond - self.millisecond);
        Ok(Time::from_day_offset(self.day_offset + delta))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Time) -> core::cmp::Ordering {
        self.day_offset.cmp(&other.day_offset)
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Time) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Debug for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "Time({:02}:{:02}:{:02}.{:03})",
            self.hour23, self.minute, self.second, self.millisecond,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_timestamp() {
        let t = Time::from_timestamp(0).unwrap();
        assert_eq!(t, Time::MIDNIGHT);

        // 2025-12-01T22:54:12.543Z
        let t = Time::from_timestamp(1_764_629_652_543).unwrap();
        assert_eq!(t.hour23(), 22);
        assert_eq!(t.hour11(), 10);
        assert_eq!(t.meridiem(), Meridiem::Pm);
        assert_eq!(t.minute(), 54);
        assert_eq!(t.second(), 12);
        assert_eq!(t.millisecond(), 543);

        // Negative timestamps still land in [0, 86_400_000).
        let t = Time::from_timestamp(-1).unwrap();
        assert_eq!(t.hour23(), 23);
        assert_eq!(t.minute(), 59);
        assert_eq!(t.second(), 59);
        assert_eq!(t.millisecond(), 999);
    }

    #[test]
    fn twelve_hour_clock_consistency() {
        for hour in 0..=23i8 {
            let t = Time::new(hour, 0, 0, 0).unwrap();
            assert_eq!(
                t.hour23(),
                t.meridiem().hour_offset() + t.hour11(),
                "hour {hour}",
            );
        }
        let noon = Time::new(12, 0, 0, 0).unwrap();
        assert_eq!(noon.hour11(), 0);
        assert_eq!(noon.meridiem(), Meridiem::Pm);
    }

    #[test]
    fn setters() {
        let t = Time::new(22, 54, 12, 543).unwrap();
        assert_eq!(t.with_hour23(3).unwrap().hour23(), 3);
        assert_eq!(t.with_minute(0).unwrap().minute(), 0);
        assert_eq!(t.with_second(59).unwrap().second(), 59);
        assert_eq!(t.with_millisecond(1).unwrap().millisecond(), 1);

        let am = t.with_meridiem(Meridiem::Am).unwrap();
        assert_eq!(am.hour23(), 10);
        assert_eq!(am.minute(), 54);

        let other = t.with_hour11(3).unwrap();
        assert_eq!(other.hour23(), 15);

        assert!(t.with_hour23(24).is_err());
        assert!(t.with_hour11(12).is_err());
        assert!(t.with_minute(60).is_err());
        assert!(t.with_second(60).is_err());
        assert!(t.with_millisecond(1000).is_err());
    }

    quickcheck::quickcheck! {
        fn prop_fields_consistent(offset: u32) -> bool {
            let t = Time::from_day_offset((offset % 86_400_000) as i32);
            t.day_offset()
                == i32::from(t.hour23()) * 3_600_000
                    + i32::from(t.minute()) * 60_000
                    + i32::from(t.second()) * 1_000
                    + i32::from(t.millisecond())
        }
    }
}
