/*!
Token-based datetime formatting and parsing on top of the template engine.

A [`DateTimeFormat`] turns a pattern like `yyyy-MM-dd` into a
[`Template`](crate::template::Template) by resolving each token in a
locale-dependent [`Context`], and converts between the template's field
records and [`DateTime`](crate::DateTime) values.

# Tokens

Tokens are matched greedily, longest first; any text that is not a token
becomes a literal separator.

| Token | Example | Description |
| ----- | ------- | ----------- |
| `y`, `yyyy` | `2024` | The year, free-form or four digits. |
| `yy` | `24` | Two-digit year, constrained to 2000..=2099. |
| `R`, `RRRR` | `2024` | The ISO week-numbering year. |
| `RR` | `24` | Two-digit ISO year, constrained to 2000..=2099. |
| `M`, `MM` | `7`, `07` | The month number. |
| `MMM`, `MMMM` | `Jul`, `July` | The month name from the context. |
| `d`, `dd` | `5`, `05` | The day of the month. |
| `D`, `DDD` | `9`, `009` | The day of the year. |
| `i` | `1` | The ISO weekday number (Monday is `1`). |
| `iii`, `iiii` | `Mon`, `Monday` | The weekday name from the context. |
| `a` | `PM` | The day period name from the context. |
| `H`, `HH` | `8`, `08` | The hour on a 24 hour clock. |
| `K`, `KK` | `8`, `08` | The hour on a 12 hour clock (0 to 11). |
| `m`, `mm` | `5`, `05` | The minute. |
| `s`, `ss` | `5`, `05` | The second. |
| `S`, `SSS` | `7`, `007` | The millisecond. |
| `zH`, `zHzH` | `+1`, `+01` | The signed hour component of the offset. |
| `zm`, `zmzm` | `30`, `30` | The minute component of the offset. |
| `zs`, `zszs` | `0`, `00` | The second component of the offset. |

Name tokens match the context tables exactly (including case). Offsets
between `-00:59` and `-00:01` cannot be expressed, because the sign rides
on the hour component.

# Example

```
use timeform::fmt::{Context, DateTimeFormat};

let context = Context::from_locale("en").expect("built-in locale");
let format = DateTimeFormat::new(&context, "iiii, MMMM d, yyyy")?;

let dt = format.parse("Monday, July 15, 2024")?;
assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 7, 15));
assert_eq!(format.format(&dt)?, "Monday, July 15, 2024");

# Ok::<(), timeform::Error>(())
```
*/

use crate::{
    datetime::{DateTime, Parts},
    error::{Error, ErrorContext as _},
    template::{
        options::{NumericFormatOptions, SignDisplay},
        Placeholder, Separator, Template, Value,
    },
};

/// Month, weekday and day period name tables, plus a name for
/// diagnostics.
///
/// A context resolves the name-bearing tokens (`MMM`, `MMMM`, `iii`,
/// `iiii`, `a`); the numeric tokens do not consult it. Build one from
/// explicit tables with [`Context::with_tables`], or look a built-in one
/// up with [`Context::from_locale`].
#[derive(Clone, Debug)]
pub struct Context {
    name: String,
    months_full: Vec<String>,
    months_abbrev: Vec<String>,
    weekdays_full: Vec<String>,
    weekdays_abbrev: Vec<String>,
    day_periods: [String; 2],
}

const MONTHS_FULL_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const MONTHS_ABBREV_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct",
    "Nov", "Dec",
];
const WEEKDAYS_FULL_EN: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const WEEKDAYS_ABBREV_EN: [&str; 7] =
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTHS_FULL_DE: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];
const MONTHS_ABBREV_DE: [&str; 12] = [
    "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt",
    "Nov", "Dez",
];
const WEEKDAYS_FULL_DE: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];
const WEEKDAYS_ABBREV_DE: [&str; 7] =
    ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];

impl Context {
    /// Creates a context from explicit name tables.
    ///
    /// Months run January through December, weekdays Monday through
    /// Sunday, day periods AM then PM.
    pub fn with_tables(
        name: impl Into<String>,
        months_full: [&str; 12],
        months_abbrev: [&str; 12],
        weekdays_full: [&str; 7],
        weekdays_abbrev: [&str; 7],
        day_periods: [&str; 2],
    ) -> Context {
        let own = |names: &[&str]| -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        };
        Context {
            name: name.into(),
            months_full: own(&months_full),
            months_abbrev: own(&months_abbrev),
            weekdays_full: own(&weekdays_full),
            weekdays_abbrev: own(&weekdays_abbrev),
            day_periods: [
                day_periods[0].to_string(),
                day_periods[1].to_string(),
            ],
        }
    }

    /// Looks up a built-in context for the given locale tag, best effort.
    ///
    /// The lookup considers only the primary language subtag, so `en`,
    /// `en-US` and `en_GB` all resolve to the same tables. An unknown
    /// locale yields `None` — no context — rather than an error; the
    /// caller decides what to fall back to.
    pub fn from_locale(locale: &str) -> Option<Context> {
        let language = locale
            .split(|ch| ch == '-' || ch == '_')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        let context = match language.as_str() {
            "en" => Context::with_tables(
                locale,
                MONTHS_FULL_EN,
                MONTHS_ABBREV_EN,
                WEEKDAYS_FULL_EN,
                WEEKDAYS_ABBREV_EN,
                ["AM", "PM"],
            ),
            "de" => Context::with_tables(
                locale,
                MONTHS_FULL_DE,
                MONTHS_ABBREV_DE,
                WEEKDAYS_FULL_DE,
                WEEKDAYS_ABBREV_DE,
                ["AM", "PM"],
            ),
            _ => {
                debug!("no built-in context for locale {locale:?}");
                return None;
            }
        };
        Some(context)
    }

    /// Returns the diagnostic name of this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn name_map(
        &self,
        name: &'static str,
        label: &str,
        table: &[String],
    ) -> Placeholder {
        let entries = table.iter().enumerate().map(|(index, entry)| {
            (entry.clone(), Value::Int(index as i64 + 1))
        });
        Placeholder::literal_map(name, entries).with_label(label)
    }

    fn meridiem_map(&self, label: &str) -> Placeholder {
        Placeholder::literal_map(
            "meridiem",
            [
                (self.day_periods[0].clone(), Value::Int(0)),
                (self.day_periods[1].clone(), Value::Int(12)),
            ],
        )
        .with_label(label)
    }
}

/// Every token, longest first, so greedy matching picks the most
/// specific one.
const TOKENS: [&str; 34] = [
    "yyyy", "RRRR", "MMMM", "iiii", "zHzH", "zmzm", "zszs", "MMM", "iii",
    "DDD", "SSS", "yy", "RR", "MM", "dd", "HH", "KK", "mm", "ss", "zH",
    "zm", "zs", "y", "R", "M", "d", "D", "i", "a", "H", "K", "m", "s", "S",
];

/// A token-pattern datetime parser/formatter.
///
/// See the [module documentation](self) for the token vocabulary.
#[derive(Clone, Debug)]
pub struct DateTimeFormat {
    pattern: String,
    template: Template,
}

impl DateTimeFormat {
    /// Builds a format from a pattern, resolving name-bearing tokens in
    /// the given context.
    ///
    /// # Errors
    ///
    /// This returns an error when the pattern is empty of tokens.
    pub fn new(
        context: &Context,
        pattern: &str,
    ) -> Result<DateTimeFormat, Error> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;
        let mut any_token = false;
        'scan: while !rest.is_empty() {
            for token in TOKENS {
                if let Some(after) = rest.strip_prefix(token) {
                    if !literal.is_empty() {
                        parts.push(
                            Separator::new(std::mem::take(&mut literal))
                                .into(),
                        );
                    }
                    parts.push(resolve_token(context, token).into());
                    any_token = true;
                    rest = after;
                    continue 'scan;
                }
            }
            // OK because `rest` is non-empty.
            let ch = rest.chars().next().unwrap();
            literal.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        if !literal.is_empty() {
            parts.push(Separator::new(literal).into());
        }
        if !any_token {
            return Err(err!(
                "pattern '{pattern}' contains no datetime tokens",
            ));
        }
        trace!("pattern {pattern:?} compiled to {count} parts", count = parts.len());
        Ok(DateTimeFormat {
            pattern: pattern.to_string(),
            template: Template::new(parts),
        })
    }

    /// Returns the pattern this format was built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the underlying template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Parses an input string into a [`DateTime`].
    ///
    /// The template parse produces a field record; the record is then
    /// resolved through [`DateTime::from_parts`], with its documented
    /// defaults and consistency checks.
    pub fn parse(&self, input: &str) -> Result<DateTime, Error> {
        let record = self.template.parse(input)?;
        let parts = Parts::from_record(&record)?;
        DateTime::from_parts(&parts).with_context(|| {
            err!("input '{input}' does not form a valid datetime")
        })
    }

    /// Formats a [`DateTime`] through this format's template.
    pub fn format(&self, datetime: &DateTime) -> Result<String, Error> {
        let record = datetime.to_parts().to_record();
        self.template.format(&record)
    }
}

fn resolve_token(context: &Context, token: &'static str) -> Placeholder {
    let unsigned = NumericFormatOptions::new().sign(SignDisplay::Never);
    let signed = NumericFormatOptions::new().sign(SignDisplay::Always);
    let fixed = |name: &'static str, length: usize| {
        Placeholder::fixed_numeric(name, length, '0', unsigned)
            .with_label(token)
    };
    let free = |name: &'static str| {
        Placeholder::numeric(name, unsigned).with_label(token)
    };
    match token {
        "y" => free("year"),
        "yyyy" => fixed("year", 4),
        "yy" => two_digit_year("year", "year", token),
        "R" => free("iso_year"),
        "RRRR" => fixed("iso_year", 4),
        "RR" => two_digit_year("iso_year", "ISO year", token),
        "M" => free("month"),
        "MM" => fixed("month", 2),
        "MMM" => context.name_map("month", token, &context.months_abbrev),
        "MMMM" => context.name_map("month", token, &context.months_full),
        "d" => free("day"),
        "dd" => fixed("day", 2),
        "D" => free("ordinal_day"),
        "DDD" => fixed("ordinal_day", 3),
        "i" => free("weekday"),
        "iii" => {
            context.name_map("weekday", token, &context.weekdays_abbrev)
        }
        "iiii" => context.name_map("weekday", token, &context.weekdays_full),
        "a" => context.meridiem_map(token),
        "H" => free("hour23"),
        "HH" => fixed("hour23", 2),
        "K" => free("hour11"),
        "KK" => fixed("hour11", 2),
        "m" => free("minute"),
        "mm" => fixed("minute", 2),
        "s" => free("second"),
        "ss" => fixed("second", 2),
        "S" => free("millisecond"),
        "SSS" => fixed("millisecond", 3),
        "zH" => Placeholder::numeric("offset_hour", signed).with_label(token),
        "zHzH" => Placeholder::fixed_numeric("offset_hour", 3, '0', signed)
            .with_label(token),
        "zm" => free("offset_minute"),
        "zmzm" => fixed("offset_minute", 2),
        "zs" => free("offset_second"),
        "zszs" => fixed("offset_second", 2),
        unknown => unreachable!("unhandled token {unknown}"),
    }
}

/// The two-digit year tokens map the textual range 00..=99 onto the
/// years 2000..=2099 with a `modify` wrapper over a plain two-digit
/// numeric placeholder.
fn two_digit_year(
    name: &'static str,
    what: &'static str,
    token: &'static str,
) -> Placeholder {
    Placeholder::fixed_numeric(
        name,
        2,
        '0',
        NumericFormatOptions::new().sign(SignDisplay::Never),
    )
    .with_label(token)
    .modify(
        |value| match value {
            Value::Int(two) => Ok(Value::Int(two + 2000)),
            value => Ok(value),
        },
        move |value| match *value {
            Value::Int(year) if (2000..=2099).contains(&year) => {
                Ok(Value::Int(year - 2000))
            }
            Value::Int(year) => Err(Error::range(what, year, 2000, 2099)),
            ref value => Ok(value.clone()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civil::Weekday;

    fn en() -> Context {
        Context::from_locale("en").unwrap()
    }

    #[test]
    fn iso_like_pattern() {
        let format =
            DateTimeFormat::new(&en(), "yyyy-MM-ddTHH:mm:ss,SSS").unwrap();
        let dt = format.parse("2024-07-15T08:30:00,123").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 7, 15));
        assert_eq!((dt.hour23(), dt.minute(), dt.second()), (8, 30, 0));
        assert_eq!(dt.millisecond(), 123);
        assert_eq!(dt.offset_minutes(), 0);
        assert_eq!(
            format.format(&dt).unwrap(),
            "2024-07-15T08:30:00,123",
        );
    }

    #[test]
    fn zone_offset_tokens() {
        let format = DateTimeFormat::new(
            &en(),
            "yyyy-MM-ddTHH:mm:ss,SSSzHzH:zmzm",
        )
        .unwrap();
        let dt = format.parse("2024-07-15T08:30:00,123+05:30").unwrap();
        assert_eq!(dt.offset_minutes(), 330);
        assert_eq!(
            format.format(&dt).unwrap(),
            "2024-07-15T08:30:00,123+05:30",
        );

        let dt = format.parse("2024-07-15T08:30:00,123-05:30").unwrap();
        assert_eq!(dt.offset_minutes(), -330);
    }

    #[test]
    fn month_and_weekday_names() {
        let format =
            DateTimeFormat::new(&en(), "iiii, MMMM d, yyyy").unwrap();
        let dt = format.parse("Monday, July 15, 2024").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 7, 15));
        assert_eq!(dt.weekday(), Weekday::Monday);
        assert_eq!(
            format.format(&dt).unwrap(),
            "Monday, July 15, 2024",
        );

        // Parsing does error checking: 2024-07-15 was not a Tuesday.
        let err = format.parse("Tuesday, July 15, 2024").unwrap_err();
        assert!(err.to_string().contains("weekday"), "{err}");
    }

    #[test]
    fn german_context() {
        let context = Context::from_locale("de-DE").unwrap();
        let format = DateTimeFormat::new(&context, "d. MMMM yyyy").unwrap();
        let dt = format.parse("15. Juli 2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (7, 15));
        assert_eq!(format.format(&dt).unwrap(), "15. Juli 2024");

        let err = format.parse("15. July 2024").unwrap_err();
        assert!(err.to_string().contains("MMMM"), "{err}");
    }

    #[test]
    fn unknown_locale_is_no_context() {
        assert!(Context::from_locale("tlh").is_none());
        assert!(Context::from_locale("").is_none());
        assert!(Context::from_locale("en-US").is_some());
        assert!(Context::from_locale("de_AT").is_some());
    }

    #[test]
    fn twelve_hour_clock_tokens() {
        let format = DateTimeFormat::new(&en(), "K:mm a").unwrap();
        let dt = format.parse("9:05 PM").unwrap();
        assert_eq!(dt.hour23(), 21);
        assert_eq!(dt.minute(), 5);
        assert_eq!(format.format(&dt).unwrap(), "9:05 PM");

        let dt = format.parse("0:00 AM").unwrap();
        assert_eq!(dt.hour23(), 0);
    }

    #[test]
    fn two_digit_year_range() {
        let format = DateTimeFormat::new(&en(), "dd/MM/yy").unwrap();
        let dt = format.parse("15/07/24").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(format.format(&dt).unwrap(), "15/07/24");

        // 1999 is outside what a two-digit year can express.
        let outside = DateTime::from_parts(&crate::datetime::Parts {
            year: Some(1999),
            ..Default::default()
        })
        .unwrap();
        let err = format.format(&outside).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'year' with value 1999 is not in the required \
             range of 2000..=2099",
        );
    }

    #[test]
    fn duplicate_field_tokens_must_agree() {
        // `MM` and `M` both target the month field.
        let format = DateTimeFormat::new(&en(), "MM/M").unwrap();
        assert!(format.parse("07/7").is_ok());
        let err = format.parse("07/8").unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "Expected equal values for duplicate placeholder 'month'. \
             Actual: '7' vs '8'",
        );
    }

    #[test]
    fn ordinal_day_tokens() {
        let format = DateTimeFormat::new(&en(), "yyyy-DDD").unwrap();
        let dt = format.parse("2024-060").unwrap();
        assert_eq!((dt.month(), dt.day()), (2, 29));
        assert_eq!(format.format(&dt).unwrap(), "2024-060");
    }

    #[test]
    fn iso_year_and_week_tokens() {
        let format = DateTimeFormat::new(&en(), "RRRR-DDD").unwrap();
        // 2005-01-01 falls in ISO year 2004.
        let dt = DateTime::from_parts(&crate::datetime::Parts {
            year: Some(2005),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(format.format(&dt).unwrap(), "2004-001");
    }

    #[test]
    fn empty_input_boundary() {
        let format = DateTimeFormat::new(&en(), "dd/MM").unwrap();
        let err = format.parse("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected length of 'dd' to be: 2. Actual: 0",
        );
    }

    #[test]
    fn separator_position_boundary() {
        let format = DateTimeFormat::new(&en(), "dd/MM").unwrap();
        let err = format.parse("25|12").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected remaining text for separator at position 2 to \
             start with '/'. Actual: '|12'",
        );
    }

    #[test]
    fn year_pads_to_four_digits() {
        let format = DateTimeFormat::new(&en(), "yyyy").unwrap();
        let dt = DateTime::from_parts(&crate::datetime::Parts {
            year: Some(987),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(format.format(&dt).unwrap(), "0987");
    }

    #[test]
    fn snapshot_error_messages() {
        let format = DateTimeFormat::new(&en(), "dd/MM").unwrap();
        insta::assert_snapshot!(
            format.parse("25|12").unwrap_err(),
            @"Expected remaining text for separator at position 2 to start with '/'. Actual: '|12'",
        );
        insta::assert_snapshot!(
            format.parse("25/123").unwrap_err(),
            @"text not consumed by template: '3'",
        );
        insta::assert_snapshot!(
            format.parse("25/13").unwrap_err(),
            @"input '25/13' does not form a valid datetime: parameter 'month' with value 13 is not in the required range of 1..=12",
        );
    }

    #[test]
    fn pattern_without_tokens_is_an_error() {
        assert!(DateTimeFormat::new(&en(), "!!").is_err());
        assert!(DateTimeFormat::new(&en(), "").is_err());
    }
}
