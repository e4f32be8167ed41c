/*!
This module defines the internal calendar cycle arithmetic.

Everything here operates on plain primitive integers: timestamps are
milliseconds since the Unix epoch, years are `i16`. The routines implicitly
assume that the inputs are valid (i.e., within the crate's minimum and
maximum ranges); range enforcement lives in the public value types.

The central idea is leap cycle decomposition: a calendar year is found by
successive quotient/remainder steps against nested cycle lengths instead
of walking dates year by year. The Gregorian civil calendar decomposes
over 400/100/4/1 year groups. The ISO week-numbering calendar has its own,
entirely separate cycle structure over 400/100/28/11/6 year groups, because
an ISO year is "long" (53 weeks) under a different rule than the Gregorian
leap rule. The two cycle structures must never be conflated.
*/

pub(crate) const MS_PER_SECOND: i64 = 1_000;
pub(crate) const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub(crate) const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub(crate) const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
pub(crate) const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// 0001-01-01T00:00:00Z, which is conveniently a Monday. The Gregorian
/// decomposition is anchored here because the cycle structure below needs
/// an anchor year of the form `400n + 1`.
const GREGORIAN_ANCHOR: i64 = -62_135_596_800_000;
const GREGORIAN_ANCHOR_YEAR: i64 = 1;

/// One 400 year Gregorian cycle: 146097 days, a constant.
const MS_400_YEARS: i64 = 146_097 * MS_PER_DAY;
/// One century inside a 400 year cycle: 36524 days. Anchored at a year of
/// the form `400n + 1`, the first three centuries of a cycle have exactly
/// this length; the fourth is one day longer because its final year is
/// divisible by 400 and therefore leap.
const MS_100_YEARS: i64 = 36_524 * MS_PER_DAY;
/// One 4 year group inside a century: 1461 days. The last group of a
/// century is a day short when the century's final year is not leap.
const MS_4_YEARS: i64 = 1_461 * MS_PER_DAY;
const MS_365_DAYS: i64 = 365 * MS_PER_DAY;

/// The start of ISO week-numbering year 201 (0200-12-29, a Monday). The
/// ISO decomposition needs an anchor year of the form `400n + 201`: at
/// that alignment the first three ISO centuries of a cycle have 5218 weeks
/// and the last has 5217, which is what makes the clamped quotient below
/// come out right.
const ISO_ANCHOR: i64 = -55_824_508_800_000;
const ISO_ANCHOR_YEAR: i64 = 201;

/// One 400 year ISO cycle: exactly 20871 weeks (146097 days is divisible
/// by 7, so the weekday pattern repeats along with the leap pattern).
const MS_ISO_400_YEARS: i64 = 20_871 * MS_PER_WEEK;
/// The first three ISO centuries of an anchored cycle: 5218 weeks each.
const MS_ISO_100_YEARS: i64 = 5_218 * MS_PER_WEEK;
/// A 28 year group with a regular leap pattern: 1461 weeks.
const MS_ISO_28_YEARS: i64 = 1_461 * MS_PER_WEEK;
/// A 6 year group (one leap year, aligned): 313 weeks.
const MS_ISO_6_YEARS: i64 = 313 * MS_PER_WEEK;
/// An 11 year group (three leap years, aligned): 574 weeks.
const MS_ISO_11_YEARS: i64 = 574 * MS_PER_WEEK;
/// A lower bound on the length of any ISO year: 52 weeks.
const MS_ISO_SHORT_YEAR: i64 = 52 * MS_PER_WEEK;

/// The result of decomposing a timestamp against the Gregorian cycles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct GregorianYear {
    pub(crate) year: i16,
    pub(crate) leap: bool,
    pub(crate) start: i64,
}

/// The result of decomposing a timestamp against the ISO cycles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct IsoYear {
    pub(crate) year: i16,
    pub(crate) long: bool,
    pub(crate) start: i64,
}

/// Returns true if and only if the given year is a leap year.
///
/// A leap year is a year with 366 days. Typical years have 365 days.
#[inline]
pub(crate) const fn is_leap_year(year: i16) -> bool {
    // From: https://github.com/BurntSushi/jiff/pull/23
    let d = if year % 25 != 0 { 4 } else { 16 };
    (year % d) == 0
}

/// Return the number of days in the given year.
#[inline]
pub(crate) const fn days_in_year(year: i16) -> i16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Return the number of days in the given month.
#[inline]
pub(crate) const fn days_in_month(year: i16, month: i8) -> i8 {
    // From: https://github.com/BurntSushi/jiff/pull/23
    if month == 2 {
        if is_leap_year(year) {
            29
        } else {
            28
        }
    } else {
        30 | (month ^ month >> 3)
    }
}

/// Decomposes a timestamp into its Gregorian civil year.
///
/// Each level divides by a cycle length and clamps the quotient, because
/// the final group of a cycle may run long: the fourth century of a 400
/// year cycle ends in a leap year, and the twenty-fifth 4 year group of
/// such a century runs a day past `24 * MS_4_YEARS`. The remainder feeds
/// the next level. No loops over individual years.
#[inline(always)]
pub(crate) const fn gregorian_year_of(t: i64) -> GregorianYear {
    let rel = t - GREGORIAN_ANCHOR;
    let n400 = rel.div_euclid(MS_400_YEARS);
    let mut r = rel.rem_euclid(MS_400_YEARS);

    let mut c = r / MS_100_YEARS;
    if c == 4 {
        c = 3;
    }
    r -= c * MS_100_YEARS;

    let mut q = r / MS_4_YEARS;
    if q == 25 {
        q = 24;
    }
    r -= q * MS_4_YEARS;

    let mut y = r / MS_365_DAYS;
    if y == 4 {
        y = 3;
    }
    r -= y * MS_365_DAYS;

    let year = GREGORIAN_ANCHOR_YEAR + 400 * n400 + 100 * c + 4 * q + y;
    // The fourth year of a 4 year group is leap, except for the final
    // group of a century whose last year is not divisible by 400.
    let leap = y == 3 && (q != 24 || c == 3);
    GregorianYear { year: year as i16, leap, start: t - r }
}

/// The inverse decomposition: the timestamp at which the given Gregorian
/// year begins. Applies the same cycle constants to `year - anchor`.
#[inline(always)]
pub(crate) const fn gregorian_year_start(year: i16) -> i64 {
    let m = (year as i64) - GREGORIAN_ANCHOR_YEAR;
    let n400 = m.div_euclid(400);
    let mut r = m.rem_euclid(400);
    let c = r / 100;
    r -= c * 100;
    let q = r / 4;
    let y = r - q * 4;
    GREGORIAN_ANCHOR
        + n400 * MS_400_YEARS
        + c * MS_100_YEARS
        + q * MS_4_YEARS
        + y * MS_365_DAYS
}

/// Returns the weekday of the given timestamp, with Monday being `0` and
/// Sunday being `6`. (The Gregorian anchor is a Monday.)
#[inline(always)]
pub(crate) const fn weekday_of(t: i64) -> i8 {
    (t - GREGORIAN_ANCHOR).div_euclid(MS_PER_DAY).rem_euclid(7) as i8
}

/// The timestamp at which the given ISO week-numbering year begins: the
/// Monday of the week containing January 4th.
#[inline(always)]
pub(crate) const fn iso_year_start(year: i16) -> i64 {
    let jan4 = gregorian_year_start(year) + 3 * MS_PER_DAY;
    jan4 - (weekday_of(jan4) as i64) * MS_PER_DAY
}

/// Returns true if and only if the given ISO year has 53 weeks.
///
/// An ISO year is long exactly when the Gregorian year starts on a
/// Thursday, or is a leap year starting on a Wednesday. This rule is
/// deliberately expressed through the weekday, not through the Gregorian
/// cycle constants.
#[inline(always)]
pub(crate) const fn iso_year_is_long(year: i16) -> bool {
    let wd = weekday_of(gregorian_year_start(year));
    wd == 3 || (is_leap_year(year) && wd == 2)
}

/// Decomposes a timestamp into its ISO week-numbering year.
///
/// The cycle structure differs from the Gregorian one: a 400 year cycle of
/// 20871 weeks; centuries of 5218 weeks (the last of a cycle has 5217); 28
/// year groups of 1461 weeks; and within a 28 year group, a 6 year group
/// of 313 weeks followed by two 11 year groups of 574 weeks. The 16 year
/// tail of a century splits 6 + 10. The final level locates the year
/// within a group of at most eleven by a quotient against the 52 week
/// lower bound, corrected by at most one step against the direct
/// year-start function.
#[inline(always)]
pub(crate) const fn iso_year_of(t: i64) -> IsoYear {
    let rel = t - ISO_ANCHOR;
    let n400 = rel.div_euclid(MS_ISO_400_YEARS);
    let mut r = rel.rem_euclid(MS_ISO_400_YEARS);

    let mut c = r / MS_ISO_100_YEARS;
    if c == 4 {
        c = 3;
    }
    r -= c * MS_ISO_100_YEARS;

    let mut q28 = r / MS_ISO_28_YEARS;
    if q28 == 4 {
        q28 = 3;
    }
    r -= q28 * MS_ISO_28_YEARS;

    // Locate the sub-group: 6+11+11 inside a regular 28 year group,
    // 6+10 inside the 16 year century tail.
    let (group_offset, group_len) = if q28 < 3 {
        if r < MS_ISO_6_YEARS {
            (0, 6)
        } else {
            let g = (r - MS_ISO_6_YEARS) / MS_ISO_11_YEARS;
            (6 + 11 * g, 11)
        }
    } else if r < MS_ISO_6_YEARS {
        (0, 6)
    } else {
        (6, 10)
    };

    let base_year =
        ISO_ANCHOR_YEAR + 400 * n400 + 100 * c + 28 * q28 + group_offset;
    let within = t - iso_year_start(base_year as i16);
    let mut k = within.div_euclid(MS_ISO_SHORT_YEAR);
    if k > group_len - 1 {
        k = group_len - 1;
    }
    let mut year = base_year + k;
    if t < iso_year_start(year as i16) {
        year -= 1;
    }
    let year = year as i16;
    IsoYear {
        year,
        long: iso_year_is_long(year),
        start: iso_year_start(year),
    }
}

/// Milliseconds into the civil day of the given timestamp.
#[inline(always)]
pub(crate) const fn time_of_day(t: i64) -> i64 {
    t.rem_euclid(MS_PER_DAY)
}

/// Cumulative days before each month, 1-indexed by month.
const DAYS_BEFORE_MONTH_COMMON: [i16; 13] =
    [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DAYS_BEFORE_MONTH_LEAP: [i16; 13] =
    [0, 0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Converts a 1-based ordinal day into a `(month, day)` pair.
#[inline]
pub(crate) const fn month_day_of_ordinal(
    leap: bool,
    ordinal: i16,
) -> (i8, i8) {
    let table = if leap {
        &DAYS_BEFORE_MONTH_LEAP
    } else {
        &DAYS_BEFORE_MONTH_COMMON
    };
    let mut month = 12;
    while table[month] >= ordinal {
        month -= 1;
    }
    (month as i8, (ordinal - table[month]) as i8)
}

/// Converts a `(month, day)` pair into a 1-based ordinal day.
#[inline]
pub(crate) const fn ordinal_of_month_day(
    leap: bool,
    month: i8,
    day: i8,
) -> i16 {
    let table = if leap {
        &DAYS_BEFORE_MONTH_LEAP
    } else {
        &DAYS_BEFORE_MONTH_COMMON
    };
    table[month as usize] + day as i16
}
