use std::sync::OnceLock;

use crate::{
    civil::{
        cycle, GregorianDate, IsoDate, Meridiem, Time, Weekday,
    },
    error::{Error, ErrorContext as _},
    template::{
        options::{NumericFormatOptions, SignDisplay},
        Placeholder, Record, Separator, Template,
    },
};

const OFFSET_MIN: i16 = -1439;
const OFFSET_MAX: i16 = 1439;

/// An instant in time with a fixed time zone offset.
///
/// A `DateTime` owns exactly two pieces of state: a millisecond timestamp
/// (UTC, Unix epoch based) and a time zone offset in minutes. Every
/// calendar and clock field — Gregorian, ISO week calendar and time of
/// day — is computed from them on demand, so nothing can drift.
///
/// The offset is an input, never computed: this crate does not know about
/// time zone databases.
///
/// # Construction from fields
///
/// [`DateTime::from_parts`] builds a `DateTime` from any subset of fields
/// with documented defaults, and [`DateTime::to_parts`] extracts every
/// field. The round trip law holds: for any `DateTime` value `dt`,
/// `DateTime::from_parts(&dt.to_parts())` reproduces `dt` exactly.
///
/// # Canonical text form
///
/// `Display` and `FromStr` go through an internal [`Template`] for the
/// ISO-8601 shape `2025-12-01T22:54:12,543+00:00`.
///
/// ```
/// use timeform::DateTime;
///
/// let dt: DateTime = "2025-12-01T22:54:12,543+00:00".parse()?;
/// assert_eq!(dt.year(), 2025);
/// assert_eq!(dt.hour23(), 22);
/// assert_eq!(dt.to_string(), "2025-12-01T22:54:12,543+00:00");
///
/// # Ok::<(), timeform::Error>(())
/// ```
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime {
    timestamp: i64,
    offset: i16,
}

impl DateTime {
    /// Creates a `DateTime` from a millisecond timestamp and a time zone
    /// offset in minutes.
    ///
    /// # Errors
    ///
    /// This returns an error when the timestamp (or the local datetime it
    /// implies) falls outside years 1 through 9999, or when the offset is
    /// outside `-1439..=1439` minutes. Offsets strictly between `-1` and
    /// `-59` minutes are also rejected: the signed-hour text
    /// representation cannot express them.
    pub fn new(timestamp: i64, offset_minutes: i16) -> Result<DateTime, Error> {
        if !(OFFSET_MIN..=OFFSET_MAX).contains(&offset_minutes) {
            return Err(Error::range(
                "time zone offset",
                offset_minutes,
                OFFSET_MIN,
                OFFSET_MAX,
            ));
        }
        if (-59..=-1).contains(&offset_minutes) {
            return Err(err!(
                "time zone offset of {offset_minutes} minutes cannot be \
                 represented with a signed hour component",
            ));
        }
        crate::civil::check_timestamp(timestamp)
            .context("timestamp is not in the supported range")?;
        let local = timestamp + i64::from(offset_minutes) * cycle::MS_PER_MINUTE;
        crate::civil::check_timestamp(local)
            .context("local datetime is not in the supported range")?;
        Ok(DateTime { timestamp, offset: offset_minutes })
    }

    /// Creates a `DateTime` with a zero offset (UTC).
    pub fn from_timestamp(timestamp: i64) -> Result<DateTime, Error> {
        DateTime::new(timestamp, 0)
    }

    /// Returns the current instant, in UTC.
    pub fn now() -> DateTime {
        let now = std::time::SystemTime::now();
        let timestamp =
            match now.duration_since(std::time::SystemTime::UNIX_EPOCH) {
                Ok(since) => clamp_i64(since.as_millis()),
                Err(before) => -clamp_i64(before.duration().as_millis()),
            };
        let timestamp = timestamp
            .clamp(crate::civil::TIMESTAMP_MIN, crate::civil::TIMESTAMP_MAX);
        DateTime { timestamp, offset: 0 }
    }

    /// Returns the timestamp, in milliseconds since the Unix epoch (UTC).
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the time zone offset, in minutes.
    pub fn offset_minutes(&self) -> i16 {
        self.offset
    }

    /// The timestamp shifted into local time. All field accessors work on
    /// this value.
    fn local(&self) -> i64 {
        self.timestamp + i64::from(self.offset) * cycle::MS_PER_MINUTE
    }

    /// Returns the Gregorian calendar view of this datetime.
    pub fn date(&self) -> GregorianDate {
        // OK because the local timestamp was validated at construction.
        GregorianDate::from_timestamp(self.local()).unwrap()
    }

    /// Returns the ISO week calendar view of this datetime.
    pub fn iso_date(&self) -> IsoDate {
        // OK because the local timestamp was validated at construction.
        IsoDate::from_timestamp(self.local()).unwrap()
    }

    /// Returns the clock time of this datetime.
    pub fn time(&self) -> Time {
        // OK because the local timestamp was validated at construction.
        Time::from_timestamp(self.local()).unwrap()
    }

    /// Returns the year, in the range `1..=9999`.
    pub fn year(&self) -> i16 {
        self.date().year()
    }

    /// Returns the month, in the range `1..=12`.
    pub fn month(&self) -> i8 {
        self.date().month()
    }

    /// Returns the day of the month, in the range `1..=31`.
    pub fn day(&self) -> i8 {
        self.date().day()
    }

    /// Returns the day of the year, in the range `1..=366`.
    pub fn ordinal_day(&self) -> i16 {
        self.date().ordinal_day()
    }

    /// Returns the ISO week-numbering year.
    pub fn iso_year(&self) -> i16 {
        self.iso_date().year()
    }

    /// Returns the ISO week, in the range `1..=53`.
    pub fn iso_week(&self) -> i8 {
        self.iso_date().iso_week()
    }

    /// Returns the weekday.
    pub fn weekday(&self) -> Weekday {
        self.iso_date().weekday()
    }

    /// Returns the hour on a 24 hour clock, in the range `0..=23`.
    pub fn hour23(&self) -> i8 {
        self.time().hour23()
    }

    /// Returns the hour on a 12 hour clock, in the range `0..=11`.
    pub fn hour11(&self) -> i8 {
        self.time().hour11()
    }

    /// Returns the meridiem.
    pub fn meridiem(&self) -> Meridiem {
        self.time().meridiem()
    }

    /// Returns the minute, in the range `0..=59`.
    pub fn minute(&self) -> i8 {
        self.time().minute()
    }

    /// Returns the second, in the range `0..=59`.
    pub fn second(&self) -> i8 {
        self.time().second()
    }

    /// Returns the millisecond, in the range `0..=999`.
    pub fn millisecond(&self) -> i16 {
        self.time().millisecond()
    }

    fn with_local(&self, local: i64) -> Result<DateTime, Error> {
        DateTime::new(
            local - i64::from(self.offset) * cycle::MS_PER_MINUTE,
            self.offset,
        )
    }

    /// Returns a new datetime with the given year.
    pub fn with_year(&self, year: i16) -> Result<DateTime, Error> {
        self.with_local(self.date().with_year(year)?.timestamp())
    }

    /// Returns a new datetime with the given month.
    pub fn with_month(&self, month: i8) -> Result<DateTime, Error> {
        self.with_local(self.date().with_month(month)?.timestamp())
    }

    /// Returns a new datetime with the given day of the month.
    pub fn with_day(&self, day: i8) -> Result<DateTime, Error> {
        self.with_local(self.date().with_day(day)?.timestamp())
    }

    /// Returns a new datetime with the given day of the year.
    pub fn with_ordinal_day(&self, ordinal: i16) -> Result<DateTime, Error> {
        self.with_local(self.date().with_ordinal_day(ordinal)?.timestamp())
    }

    /// Returns a new datetime with the given ISO year, preserving the ISO
    /// week and weekday. Setting a week-53 datetime onto a short ISO year
    /// fails.
    pub fn with_iso_year(&self, year: i16) -> Result<DateTime, Error> {
        self.with_local(self.iso_date().with_year(year)?.timestamp())
    }

    /// Returns a new datetime with the given ISO week. Week 53 exists
    /// only in long ISO years.
    pub fn with_iso_week(&self, week: i8) -> Result<DateTime, Error> {
        self.with_local(self.iso_date().with_iso_week(week)?.timestamp())
    }

    /// Returns a new datetime with the given weekday, staying within the
    /// same ISO week.
    pub fn with_weekday(&self, weekday: Weekday) -> Result<DateTime, Error> {
        self.with_local(self.iso_date().with_weekday(weekday)?.timestamp())
    }

    fn with_time(&self, time: Time) -> Result<DateTime, Error> {
        let old = self.time();
        let delta = i64::from(time.day_offset() - old.day_offset());
        self.with_local(self.local() + delta)
    }

    /// Returns a new datetime with the given 24 hour clock hour.
    pub fn with_hour23(&self, hour23: i8) -> Result<DateTime, Error> {
        self.with_time(self.time().with_hour23(hour23)?)
    }

    /// Returns a new datetime with the given 12 hour clock hour, keeping
    /// the meridiem.
    pub fn with_hour11(&self, hour11: i8) -> Result<DateTime, Error> {
        self.with_time(self.time().with_hour11(hour11)?)
    }

    /// Returns a new datetime with the given meridiem, keeping the 12
    /// hour clock hour.
    pub fn with_meridiem(&self, meridiem: Meridiem) -> Result<DateTime, Error> {
        self.with_time(self.time().with_meridiem(meridiem)?)
    }

    /// Returns a new datetime with the given minute.
    pub fn with_minute(&self, minute: i8) -> Result<DateTime, Error> {
        self.with_time(self.time().with_minute(minute)?)
    }

    /// Returns a new datetime with the given second.
    pub fn with_second(&self, second: i8) -> Result<DateTime, Error> {
        self.with_time(self.time().with_second(second)?)
    }

    /// Returns a new datetime with the given millisecond.
    pub fn with_millisecond(&self, millisecond: i16) -> Result<DateTime, Error> {
        self.with_time(self.time().with_millisecond(millisecond)?)
    }

    /// Returns a new datetime with the given time zone offset. The
    /// instant is unchanged; the local fields move.
    pub fn with_offset(&self, offset_minutes: i16) -> Result<DateTime, Error> {
        DateTime::new(self.timestamp, offset_minutes)
    }

    /// Extracts every calendar, clock and offset field.
    pub fn to_parts(&self) -> Parts {
        let date = self.date();
        let iso = self.iso_date();
        let time = self.time();
        let offset = self.offset;
        Parts {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
            ordinal_day: Some(date.ordinal_day()),
            iso_year: Some(iso.year()),
            iso_week: Some(iso.iso_week()),
            weekday: Some(iso.weekday()),
            hour23: Some(time.hour23()),
            hour11: Some(time.hour11()),
            meridiem: Some(time.meridiem()),
            minute: Some(time.minute()),
            second: Some(time.second()),
            millisecond: Some(time.millisecond()),
            offset_hour: Some((offset / 60) as i8),
            offset_minute: Some((offset.abs() % 60) as i8),
            offset_second: Some(0),
        }
    }

    /// Builds a `DateTime` from any subset of fields.
    ///
    /// Omitted fields default as follows: the offset defaults to zero;
    /// the civil date defaults to 1970-01-01 (year, then month `1`, then
    /// day `1`); when only ISO fields are given, the ISO year defaults to
    /// 1970, the week to `1` and the weekday to Monday; the clock
    /// defaults to midnight (or to `meridiem + hour11` when the 12 hour
    /// fields are given).
    ///
    /// Redundant fields must be consistent: the ordinal day against month
    /// and day, the weekday and the ISO fields against the resolved date,
    /// and the 12 hour clock fields against the 24 hour clock. Any
    /// inconsistency is an error, as is any field out of range.
    pub fn from_parts(parts: &Parts) -> Result<DateTime, Error> {
        let offset = resolve_offset(parts)?;
        let date_ms = resolve_date(parts)?;
        let time_ms = resolve_time(parts)?;
        let local = date_ms + time_ms;
        DateTime::new(
            local - i64::from(offset) * cycle::MS_PER_MINUTE,
            offset,
        )
        .context("resolved fields do not form a representable datetime")
    }
}

fn clamp_i64(millis: u128) -> i64 {
    i64::try_from(millis).unwrap_or(i64::MAX)
}

/// A bag of optional datetime fields: the result of extraction and the
/// input of construction.
///
/// This is the boundary between the template engine's string-keyed
/// records and [`DateTime`] values: see [`Parts::from_record`] and
/// [`Parts::to_record`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parts {
    pub year: Option<i16>,
    pub month: Option<i8>,
    pub day: Option<i8>,
    pub ordinal_day: Option<i16>,
    pub iso_year: Option<i16>,
    pub iso_week: Option<i8>,
    pub weekday: Option<Weekday>,
    pub hour23: Option<i8>,
    pub hour11: Option<i8>,
    pub meridiem: Option<Meridiem>,
    pub minute: Option<i8>,
    pub second: Option<i8>,
    pub millisecond: Option<i16>,
    /// The signed hour component of the offset. Carries the sign for the
    /// whole offset.
    pub offset_hour: Option<i8>,
    /// The minute component of the offset, always non-negative.
    pub offset_minute: Option<i8>,
    /// The second component of the offset. The offset granularity of
    /// [`DateTime`] is minutes, so any non-zero value is out of range.
    pub offset_second: Option<i8>,
}

fn resolve_offset(parts: &Parts) -> Result<i16, Error> {
    let hour = parts.offset_hour.unwrap_or(0);
    if !(-23..=23).contains(&hour) {
        return Err(Error::range("offset hours", hour, -23, 23));
    }
    let minute = parts.offset_minute.unwrap_or(0);
    if !(0..=59).contains(&minute) {
        return Err(Error::range("offset minutes", minute, 0, 59));
    }
    let second = parts.offset_second.unwrap_or(0);
    if second != 0 {
        return Err(Error::range("offset seconds", second, 0, 0));
    }
    let magnitude = i16::from(hour.abs()) * 60 + i16::from(minute);
    Ok(if hour < 0 { -magnitude } else { magnitude })
}

/// Resolves the date fields to the local midnight timestamp of the
/// resolved day.
fn resolve_date(parts: &Parts) -> Result<i64, Error> {
    let civil_given = parts.year.is_some()
        || parts.month.is_some()
        || parts.day.is_some()
        || parts.ordinal_day.is_some();
    let iso_given = parts.iso_year.is_some() || parts.iso_week.is_some();

    let date_ms = if civil_given || !iso_given {
        resolve_civil_date(parts)?
    } else {
        resolve_iso_date(parts)?
    };

    // Whatever path resolved the date, every given field must agree with
    // it.
    if let Some(weekday) = parts.weekday {
        // OK because `cycle::weekday_of` always returns 0..=6.
        let resolved =
            Weekday::from_monday_zero_offset(cycle::weekday_of(date_ms))
                .unwrap();
        if weekday != resolved {
            return Err(err!(
                "weekday {weekday:?} does not match the resolved \
                 date, which falls on a {resolved:?}",
            ));
        }
    }
    if civil_given && iso_given {
        let iso = cycle::iso_year_of(date_ms);
        if let Some(iso_year) = parts.iso_year {
            if iso_year != iso.year {
                return Err(err!(
                    "ISO year {iso_year} does not match the resolved \
                     date, which falls in ISO year {year}",
                    year = iso.year,
                ));
            }
        }
        if let Some(iso_week) = parts.iso_week {
            let resolved = ((date_ms - iso.start) / cycle::MS_PER_WEEK + 1)
                as i8;
            if iso_week != resolved {
                return Err(err!(
                    "ISO week {iso_week} does not match the resolved \
                     date, which falls in week {resolved}",
                ));
            }
        }
    }
    Ok(date_ms)
}

fn resolve_civil_date(parts: &Parts) -> Result<i64, Error> {
    let year = parts.year.unwrap_or(1970);
    if !(1..=9999).contains(&year) {
        return Err(Error::range("year", year, 1, 9999));
    }
    let leap = cycle::is_leap_year(year);
    let ordinal = match parts.ordinal_day {
        Some(ordinal) => {
            let max = cycle::days_in_year(year);
            if !(1..=max).contains(&ordinal) {
                return Err(Error::range("day of year", ordinal, 1, max));
            }
            let (month, day) = cycle::month_day_of_ordinal(leap, ordinal);
            if let Some(given) = parts.month {
                if given != month {
                    return Err(err!(
                        "month {given} does not match day of year \
                         {ordinal}, which falls in month {month}",
                    ));
                }
            }
            if let Some(given) = parts.day {
                if given != day {
                    return Err(err!(
                        "day {given} does not match day of year \
                         {ordinal}, which falls on day {day}",
                    ));
                }
            }
            ordinal
        }
        None => {
            let month = parts.month.unwrap_or(1);
            if !(1..=12).contains(&month) {
                return Err(Error::range("month", month, 1, 12));
            }
            let day = parts.day.unwrap_or(1);
            let max = cycle::days_in_month(year, month);
            if !(1..=max).contains(&day) {
                return Err(Error::range("day", day, 1, max));
            }
            cycle::ordinal_of_month_day(leap, month, day)
        }
    };
    Ok(cycle::gregorian_year_start(year)
        + i64::from(ordinal - 1) * cycle::MS_PER_DAY)
}

fn resolve_iso_date(parts: &Parts) -> Result<i64, Error> {
    let year = parts.iso_year.unwrap_or(1970);
    if !(1..=9999).contains(&year) {
        return Err(Error::range("ISO year", year, 1, 9999));
    }
    let week = parts.iso_week.unwrap_or(1);
    let max = if cycle::iso_year_is_long(year) { 53 } else { 52 };
    if !(1..=max).contains(&week) {
        return Err(Error::range("ISO week", week, 1, max));
    }
    let weekday = parts.weekday.unwrap_or(Weekday::Monday);
    Ok(cycle::iso_year_start(year)
        + i64::from(week - 1) * cycle::MS_PER_WEEK
        + i64::from(weekday.to_monday_zero_offset()) * cycle::MS_PER_DAY)
}

/// Resolves the clock fields to milliseconds past local midnight.
fn resolve_time(parts: &Parts) -> Result<i64, Error> {
    let hour23 = match (parts.hour23, parts.hour11, parts.meridiem) {
        (Some(hour23), hour11, meridiem) => {
            if !(0..=23).contains(&hour23) {
                return Err(Error::range("hour", hour23, 0, 23));
            }
            if let Some(hour11) = hour11 {
                if hour11 != hour23 % 12 {
                    return Err(err!(
                        "hour {hour11} on the 12 hour clock does not \
                         match hour {hour23} on the 24 hour clock",
                    ));
                }
            }
            if let Some(meridiem) = meridiem {
                if meridiem != Meridiem::from_hour23(hour23) {
                    return Err(err!(
                        "meridiem {meridiem:?} does not match hour \
                         {hour23} on the 24 hour clock",
                    ));
                }
            }
            hour23
        }
        (None, Some(hour11), meridiem) => {
            if !(0..=11).contains(&hour11) {
                return Err(Error::range(
                    "hour (12 hour clock)",
                    hour11,
                    0,
                    11,
                ));
            }
            meridiem.unwrap_or(Meridiem::Am).hour_offset() + hour11
        }
        (None, None, meridiem) => {
            meridiem.unwrap_or(Meridiem::Am).hour_offset()
        }
    };
    let minute = parts.minute.unwrap_or(0);
    if !(0..=59).contains(&minute) {
        return Err(Error::range("minute", minute, 0, 59));
    }
    let second = parts.second.unwrap_or(0);
    if !(0..=59).contains(&second) {
        return Err(Error::range("second", second, 0, 59));
    }
    let millisecond = parts.millisecond.unwrap_or(0);
    if !(0..=999).contains(&millisecond) {
        return Err(Error::range("millisecond", millisecond, 0, 999));
    }
    Ok(i64::from(hour23) * cycle::MS_PER_HOUR
        + i64::from(minute) * cycle::MS_PER_MINUTE
        + i64::from(second) * cycle::MS_PER_SECOND
        + i64::from(millisecond))
}

impl Parts {
    /// Converts a template engine record into parts.
    ///
    /// Recognized field names are `year`, `month`, `day`, `ordinal_day`,
    /// `iso_year`, `iso_week`, `weekday` (ISO weekday number), `hour23`,
    /// `hour11`, `meridiem` (`0` or `12`), `minute`, `second`,
    /// `millisecond`, `offset_hour`, `offset_minute` and `offset_second`.
    /// Unknown fields are ignored.
    pub fn from_record(record: &Record) -> Result<Parts, Error> {
        let weekday = match int_field(record, "weekday", 1, 7)? {
            None => None,
            // OK because the value was just range checked.
            Some(number) => {
                Some(Weekday::from_monday_one_offset(number as i8).unwrap())
            }
        };
        let meridiem = match int_field(record, "meridiem", 0, 12)? {
            None => None,
            Some(offset) => Some(Meridiem::from_hour_offset(offset as i8)?),
        };
        Ok(Parts {
            year: cast_field(record, "year")?,
            month: cast_field(record, "month")?,
            day: cast_field(record, "day")?,
            ordinal_day: cast_field(record, "ordinal_day")?,
            iso_year: cast_field(record, "iso_year")?,
            iso_week: cast_field(record, "iso_week")?,
            weekday,
            hour23: cast_field(record, "hour23")?,
            hour11: cast_field(record, "hour11")?,
            meridiem,
            minute: cast_field(record, "minute")?,
            second: cast_field(record, "second")?,
            millisecond: cast_field(record, "millisecond")?,
            offset_hour: cast_field(record, "offset_hour")?,
            offset_minute: cast_field(record, "offset_minute")?,
            offset_second: cast_field(record, "offset_second")?,
        })
    }

    /// Converts these parts into a template engine record, with one entry
    /// per present field, under the names [`Parts::from_record`] reads.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        set_int(&mut record, "year", self.year);
        set_int(&mut record, "month", self.month);
        set_int(&mut record, "day", self.day);
        set_int(&mut record, "ordinal_day", self.ordinal_day);
        set_int(&mut record, "iso_year", self.iso_year);
        set_int(&mut record, "iso_week", self.iso_week);
        if let Some(weekday) = self.weekday {
            record.set(
                "weekday",
                i64::from(weekday.to_monday_one_offset()),
            );
        }
        set_int(&mut record, "hour23", self.hour23);
        set_int(&mut record, "hour11", self.hour11);
        if let Some(meridiem) = self.meridiem {
            record.set("meridiem", i64::from(meridiem.hour_offset()));
        }
        set_int(&mut record, "minute", self.minute);
        set_int(&mut record, "second", self.second);
        set_int(&mut record, "millisecond", self.millisecond);
        set_int(&mut record, "offset_hour", self.offset_hour);
        set_int(&mut record, "offset_minute", self.offset_minute);
        set_int(&mut record, "offset_second", self.offset_second);
        record
    }
}

fn set_int<T: Into<i64>>(record: &mut Record, name: &str, value: Option<T>) {
    if let Some(value) = value {
        record.set(name, value.into());
    }
}

fn int_field(
    record: &Record,
    name: &'static str,
    min: i64,
    max: i64,
) -> Result<Option<i64>, Error> {
    match record.int(name) {
        None => Ok(None),
        Some(number) if (min..=max).contains(&number) => Ok(Some(number)),
        Some(number) => Err(Error::range(name, number, min, max)),
    }
}

/// Reads a record field into any integer type, reporting values that do
/// not even fit the type as range errors. Precise calendar range checks
/// happen later in `from_parts`.
fn cast_field<T>(record: &Record, name: &'static str) -> Result<Option<T>, Error>
where
    T: TryFrom<i64> + Into<i64> + Copy,
{
    match record.int(name) {
        None => Ok(None),
        Some(number) => match T::try_from(number) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(err!(
                "parameter '{name}' with value {number} is too far out \
                 of range",
            )),
        },
    }
}

/// The template behind `Display`/`FromStr`:
/// `2025-12-01T22:54:12,543+00:00`.
fn iso_template() -> &'static Template {
    static TEMPLATE: OnceLock<Template> = OnceLock::new();
    TEMPLATE.get_or_init(|| {
        let unsigned = NumericFormatOptions::new().sign(SignDisplay::Never);
        let signed = NumericFormatOptions::new().sign(SignDisplay::Always);
        Template::new(vec![
            Placeholder::fixed_numeric("year", 4, '0', unsigned).into(),
            Separator::new("-").into(),
            Placeholder::fixed_numeric("month", 2, '0', unsigned).into(),
            Separator::new("-").into(),
            Placeholder::fixed_numeric("day", 2, '0', unsigned).into(),
            Separator::new("T").into(),
            Placeholder::fixed_numeric("hour23", 2, '0', unsigned)
                .with_label("hour")
                .into(),
            Separator::new(":").into(),
            Placeholder::fixed_numeric("minute", 2, '0', unsigned).into(),
            Separator::new(":").into(),
            Placeholder::fixed_numeric("second", 2, '0', unsigned).into(),
            Separator::new(",").into(),
            Placeholder::fixed_numeric("millisecond", 3, '0', unsigned)
                .into(),
            Placeholder::fixed_numeric("offset_hour", 3, '0', signed)
                .with_label("offset hours")
                .into(),
            Separator::new(":").into(),
            Placeholder::fixed_numeric("offset_minute", 2, '0', unsigned)
                .with_label("offset minutes")
                .into(),
        ])
    })
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Formatting a valid datetime through the canonical template
        // cannot fail: every field fits its fixed length.
        let record = self.to_parts().to_record();
        let formatted =
            iso_template().format(&record).map_err(|_| core::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl core::fmt::Debug for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "DateTime({self})")
    }
}

impl core::str::FromStr for DateTime {
    type Err = Error;

    fn from_str(text: &str) -> Result<DateTime, Error> {
        let record = iso_template()
            .parse(text)
            .context("failed to parse ISO-8601 datetime")?;
        let parts = Parts::from_record(&record)?;
        DateTime::from_parts(&parts)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DateTime {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DateTime {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime, D::Error> {
        struct DateTimeVisitor;

        impl<'de> serde::de::Visitor<'de> for DateTimeVisitor {
            type Value = DateTime;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("an ISO-8601 datetime string")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                value: &str,
            ) -> Result<DateTime, E> {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(DateTimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(text: &str) -> DateTime {
        text.parse().unwrap()
    }

    #[test]
    fn display_roundtrip() {
        let text = "2025-12-01T22:54:12,543+00:00";
        assert_eq!(dt(text).to_string(), text);

        let text = "0001-01-01T00:00:00,000+00:00";
        assert_eq!(dt(text).to_string(), text);

        let text = "9999-12-31T23:59:59,999+00:00";
        assert_eq!(dt(text).to_string(), text);

        let text = "2024-02-29T06:00:00,000-05:30";
        let parsed = dt(text);
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.offset_minutes(), -330);
    }

    #[test]
    fn accessors() {
        let d = dt("2025-12-01T22:54:12,543+00:00");
        assert_eq!(d.year(), 2025);
        assert_eq!(d.month(), 12);
        assert_eq!(d.day(), 1);
        assert_eq!(d.ordinal_day(), 335);
        assert_eq!(d.weekday(), Weekday::Monday);
        assert_eq!(d.iso_year(), 2025);
        assert_eq!(d.iso_week(), 49);
        assert_eq!(d.hour23(), 22);
        assert_eq!(d.hour11(), 10);
        assert_eq!(d.meridiem(), Meridiem::Pm);
        assert_eq!(d.minute(), 54);
        assert_eq!(d.second(), 12);
        assert_eq!(d.millisecond(), 543);
    }

    #[test]
    fn offset_changes_local_fields_not_instant() {
        let utc = dt("2025-06-15T23:30:00,000+00:00");
        let shifted = utc.with_offset(120).unwrap();
        assert_eq!(shifted.timestamp(), utc.timestamp());
        assert_eq!(shifted.day(), 16);
        assert_eq!(shifted.hour23(), 1);
        assert_eq!(shifted.minute(), 30);
    }

    #[test]
    fn from_parts_defaults() {
        let d = DateTime::from_parts(&Parts::default()).unwrap();
        assert_eq!(d.to_string(), "1970-01-01T00:00:00,000+00:00");

        let d = DateTime::from_parts(&Parts {
            year: Some(2024),
            ..Parts::default()
        })
        .unwrap();
        assert_eq!(d.to_string(), "2024-01-01T00:00:00,000+00:00");

        let d = DateTime::from_parts(&Parts {
            iso_year: Some(2024),
            iso_week: Some(27),
            weekday: Some(Weekday::Thursday),
            ..Parts::default()
        })
        .unwrap();
        assert_eq!(d.year(), 2024);
        assert_eq!((d.month(), d.day()), (7, 4));
    }

    #[test]
    fn from_parts_twelve_hour_clock() {
        let d = DateTime::from_parts(&Parts {
            hour11: Some(10),
            meridiem: Some(Meridiem::Pm),
            ..Parts::default()
        })
        .unwrap();
        assert_eq!(d.hour23(), 22);

        // Consistent redundancy is fine.
        let d = DateTime::from_parts(&Parts {
            hour23: Some(22),
            hour11: Some(10),
            meridiem: Some(Meridiem::Pm),
            ..Parts::default()
        })
        .unwrap();
        assert_eq!(d.hour23(), 22);

        // Inconsistent redundancy is not.
        let err = DateTime::from_parts(&Parts {
            hour23: Some(22),
            meridiem: Some(Meridiem::Am),
            ..Parts::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("meridiem"), "{err}");
    }

    #[test]
    fn from_parts_inconsistencies() {
        // 2024-07-01 is a Monday, not a Friday.
        let err = DateTime::from_parts(&Parts {
            year: Some(2024),
            month: Some(7),
            day: Some(1),
            weekday: Some(Weekday::Friday),
            ..Parts::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("weekday"), "{err}");

        // Day of year 60 of 2024 is Feb 29, not Mar 1.
        let err = DateTime::from_parts(&Parts {
            year: Some(2024),
            month: Some(3),
            day: Some(1),
            ordinal_day: Some(60),
            ..Parts::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("does not match"), "{err}");

        // Feb 30 does not exist.
        let err = DateTime::from_parts(&Parts {
            year: Some(2024),
            month: Some(2),
            day: Some(30),
            ..Parts::default()
        })
        .unwrap_err();
        assert!(err.is_range());

        // Week 53 in a short ISO year does not exist.
        let err = DateTime::from_parts(&Parts {
            iso_year: Some(2005),
            iso_week: Some(53),
            ..Parts::default()
        })
        .unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn parts_roundtrip_law() {
        for text in [
            "2025-12-01T22:54:12,543+00:00",
            "2004-01-01T00:00:00,000+01:00",
            "2005-01-01T23:59:59,999-11:30",
            "1970-01-01T00:00:00,000+00:00",
            "2024-02-29T12:00:00,001+13:45",
        ] {
            let original = dt(text);
            let rebuilt =
                DateTime::from_parts(&original.to_parts()).unwrap();
            assert_eq!(rebuilt, original, "{text}");
        }
    }

    #[test]
    fn setters() {
        let d = dt("2024-02-29T12:00:00,000+00:00");
        assert!(d.with_year(2025).is_err());
        assert_eq!(
            d.with_year(2028).unwrap().to_string(),
            "2028-02-29T12:00:00,000+00:00",
        );
        assert_eq!(
            d.with_hour23(0).unwrap().to_string(),
            "2024-02-29T00:00:00,000+00:00",
        );
        assert_eq!(d.with_minute(59).unwrap().minute(), 59);
        assert_eq!(d.with_meridiem(Meridiem::Am).unwrap().hour23(), 0);

        // ISO setters respect the long/short year rule.
        let d = dt("2004-12-30T08:00:00,000+00:00");
        assert_eq!(d.iso_week(), 53);
        assert!(d.with_iso_year(2005).is_err());
        assert_eq!(d.with_iso_year(2009).unwrap().iso_week(), 53);
        let week1 = d.with_iso_week(1).unwrap();
        assert_eq!(week1.iso_week(), 1);
        assert_eq!(week1.weekday(), d.weekday());
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!("2025-12-01".parse::<DateTime>().is_err());
        assert!("2025-13-01T00:00:00,000+00:00".parse::<DateTime>().is_err());
        assert!("2025-12-01T22:54:12,543".parse::<DateTime>().is_err());
        assert!("2025-12-01T22:54:12,543+00:00x"
            .parse::<DateTime>()
            .is_err());
    }

    #[test]
    fn unrepresentable_offsets_are_rejected() {
        assert!(DateTime::new(0, -30).is_err());
        assert!(DateTime::new(0, -60).is_ok());
        assert!(DateTime::new(0, 30).is_ok());
        assert!(DateTime::new(0, 1440).is_err());
    }

    #[test]
    fn now_is_in_range() {
        let d = DateTime::now();
        assert!(d.year() >= 2024);
        assert_eq!(d.offset_minutes(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let d = dt("2025-12-01T22:54:12,543+00:00");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2025-12-01T22:54:12,543+00:00\"");
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<DateTime>("\"2025-13-01\"").is_err());
    }

    fn arbitrary_datetime(seed: u64) -> DateTime {
        use crate::civil::{TIMESTAMP_MAX, TIMESTAMP_MIN};
        // Keep a day of slack on both ends so any offset stays in range.
        let min = TIMESTAMP_MIN + 86_400_000;
        let max = TIMESTAMP_MAX - 86_400_000;
        let span = (max - min) as u64 + 1;
        let timestamp = min + (seed % span) as i64;
        let offsets = [0i16, 60, -60, 330, -330, 765, 840, 1439, -1439];
        let offset = offsets[(seed % offsets.len() as u64) as usize];
        DateTime::new(timestamp, offset).unwrap()
    }

    quickcheck::quickcheck! {
        fn prop_parts_roundtrip(seed: u64) -> bool {
            let d = arbitrary_datetime(seed);
            DateTime::from_parts(&d.to_parts()).unwrap() == d
        }

        fn prop_display_fromstr_roundtrip(seed: u64) -> bool {
            let d = arbitrary_datetime(seed);
            d.to_string().parse::<DateTime>().unwrap() == d
        }
    }
}
