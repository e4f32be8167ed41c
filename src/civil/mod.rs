/*!
Calendar value types computed from millisecond timestamps.

This module provides the two calendar views this crate knows about, plus
clock time:

* [`GregorianDate`] — the civil Gregorian calendar: year, leap flag,
  ordinal day, month and day of the month.
* [`IsoDate`] — the ISO week-numbering calendar: ISO year, long-year flag,
  week and weekday. Weeks run Monday through Sunday and the first week of a
  year is the one containing January 4th.
* [`Time`] — the clock fields of a timestamp within its civil day.

All three are immutable views of a single millisecond timestamp; every
`with_*` setter returns a new value whose timestamp has been shifted by the
exact delta between the old and new field. The two calendars are computed
through entirely separate constant-time cycle decompositions and agree only
where the calendars themselves agree.
*/

pub use self::{
    date::GregorianDate,
    iso::IsoDate,
    time::{Meridiem, Time},
};

pub(crate) mod cycle;
mod date;
mod iso;
mod time;

use crate::error::Error;

/// The minimum supported timestamp: 0001-01-01T00:00:00.000Z.
pub const TIMESTAMP_MIN: i64 = -62_135_596_800_000;
/// The maximum supported timestamp: 9999-12-31T23:59:59.999Z.
pub const TIMESTAMP_MAX: i64 = 253_402_300_799_999;

/// Checks that a timestamp lies in the supported range.
pub(crate) fn check_timestamp(t: i64) -> Result<i64, Error> {
    if t < TIMESTAMP_MIN || t > TIMESTAMP_MAX {
        return Err(Error::range("timestamp", t, TIMESTAMP_MIN, TIMESTAMP_MAX));
    }
    Ok(t)
}

/// A day of the week.
///
/// The default representation follows ISO 8601: the week begins on Monday,
/// and numeric conversions treat Monday as `1` and Sunday as `7`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Converts an offset to a weekday, where `0` is Monday and `6` is
    /// Sunday.
    pub fn from_monday_zero_offset(offset: i8) -> Result<Weekday, Error> {
        if !(0..=6).contains(&offset) {
            return Err(Error::range("weekday offset", offset, 0, 6));
        }
        Ok(Weekday::ALL[offset as usize])
    }

    /// Converts an offset to a weekday, where `1` is Monday and `7` is
    /// Sunday. This is the ISO 8601 weekday number.
    pub fn from_monday_one_offset(offset: i8) -> Result<Weekday, Error> {
        if !(1..=7).contains(&offset) {
            return Err(Error::range("weekday number", offset, 1, 7));
        }
        Ok(Weekday::ALL[(offset - 1) as usize])
    }

    /// Returns this weekday as an offset, where Monday is `0` and Sunday
    /// is `6`.
    pub fn to_monday_zero_offset(self) -> i8 {
        self as i8
    }

    /// Returns this weekday as an offset, where Monday is `1` and Sunday
    /// is `7`. This is the ISO 8601 weekday number.
    pub fn to_monday_one_offset(self) -> i8 {
        self as i8 + 1
    }
}
