use std::sync::Arc;

use regex::Regex;

use crate::{
    error::{Error, ErrorContext as _},
    template::{
        options::{self, NumericFormatOptions},
        TemplateError, Value,
    },
};

/// Where a padded placeholder puts its fill characters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PadPosition {
    /// Fill characters go before the value; parsing trims them from the
    /// start.
    Start,
    /// Fill characters go after the value; parsing trims them from the
    /// end.
    End,
}

/// A named template part with independent parse and format logic for one
/// typed field.
///
/// Two placeholders are distinguished by `name` only: the name is the key
/// under which a parsed value lands in the [`Record`](crate::template::Record),
/// and the key a format looks up. The `label` is what error messages call
/// the placeholder; it defaults to the name.
///
/// A placeholder is built from one of several strategies (fixed-length
/// text, padded text, fixed-length or free-form numbers, a bijective
/// literal map, a bounded regular expression) and can be wrapped with
/// [`modify`](Placeholder::modify) to change its logical type without
/// touching its textual shape.
#[derive(Clone)]
pub struct Placeholder {
    name: String,
    label: String,
    description: String,
    strategy: Strategy,
}

#[derive(Clone)]
enum Strategy {
    Fixed {
        length: usize,
    },
    Padded {
        length: usize,
        fill: char,
        position: PadPosition,
        disallow_empty: bool,
    },
    FixedNumeric {
        length: usize,
        fill: char,
        options: NumericFormatOptions,
    },
    Numeric {
        options: NumericFormatOptions,
    },
    LiteralMap {
        entries: Vec<(String, Value)>,
    },
    Regex {
        pattern: Regex,
        source: String,
    },
    Modified {
        base: Box<Placeholder>,
        post_parse: Arc<dyn Fn(Value) -> Result<Value, Error> + Send + Sync>,
        pre_format: Arc<dyn Fn(&Value) -> Result<Value, Error> + Send + Sync>,
    },
}

impl Placeholder {
    fn new(name: impl Into<String>, strategy: Strategy) -> Placeholder {
        let name = name.into();
        Placeholder { label: name.clone(), description: String::new(), name, strategy }
    }

    /// A placeholder that consumes exactly `length` characters and yields
    /// them as a string value. Formatting requires a string of exactly
    /// that length.
    pub fn fixed(name: impl Into<String>, length: usize) -> Placeholder {
        Placeholder::new(name, Strategy::Fixed { length })
    }

    /// A fixed-length placeholder that trims a fill character after
    /// parsing and pads with it before formatting.
    ///
    /// With `disallow_empty`, input consisting entirely of the fill
    /// character is rejected instead of being trimmed to the empty
    /// string.
    pub fn padded(
        name: impl Into<String>,
        length: usize,
        fill: char,
        position: PadPosition,
        disallow_empty: bool,
    ) -> Placeholder {
        Placeholder::new(
            name,
            Strategy::Padded { length, fill, position, disallow_empty },
        )
    }

    /// A fixed-length numeric placeholder. The fill character is accepted
    /// (and emitted) between the sign and the digits to reach the fixed
    /// length.
    pub fn fixed_numeric(
        name: impl Into<String>,
        length: usize,
        fill: char,
        options: NumericFormatOptions,
    ) -> Placeholder {
        Placeholder::new(
            name,
            Strategy::FixedNumeric { length, fill, options },
        )
    }

    /// A free-form numeric placeholder: greedily consumes the longest
    /// numeric prefix the options permit. Use this when the field is not
    /// positionally bounded.
    pub fn numeric(
        name: impl Into<String>,
        options: NumericFormatOptions,
    ) -> Placeholder {
        Placeholder::new(name, Strategy::Numeric { options })
    }

    /// A placeholder over a bijective literal-to-value table.
    ///
    /// Parsing picks the **first** literal in table order that is a
    /// prefix of the remaining text; order ambiguous literals
    /// longest-first, or a shorter literal will capture the input meant
    /// for a longer one. Formatting looks the literal up by value
    /// equality.
    pub fn literal_map<N, L>(
        name: N,
        entries: impl IntoIterator<Item = (L, Value)>,
    ) -> Placeholder
    where
        N: Into<String>,
        L: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(literal, value)| (literal.into(), value))
            .collect();
        Placeholder::new(name, Strategy::LiteralMap { entries })
    }

    /// A placeholder that matches the given pattern anchored at the start
    /// of the remaining text and yields the matched text as a string
    /// value. Formatting re-validates that the value matches the pattern
    /// across its entire length, so a formatter cannot silently truncate.
    ///
    /// # Errors
    ///
    /// This returns an error when the pattern does not compile.
    pub fn regex(
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Placeholder, Error> {
        let anchored = format!("^(?:{pattern})");
        let compiled = Regex::new(&anchored).map_err(|regex_err| {
            err!("pattern /{pattern}/ failed to compile: {regex_err}")
        })?;
        Ok(Placeholder::new(
            name,
            Strategy::Regex { pattern: compiled, source: pattern.to_string() },
        ))
    }

    /// Sets the label used for this placeholder in error messages.
    pub fn with_label(mut self, label: impl Into<String>) -> Placeholder {
        self.label = label.into();
        self
    }

    /// Sets the human readable description of this placeholder.
    pub fn with_description(
        mut self,
        description: impl Into<String>,
    ) -> Placeholder {
        self.description = description.into();
        self
    }

    /// Wraps this placeholder with a post-parse and a pre-format
    /// transformation, changing its logical type while preserving its
    /// length and position semantics.
    ///
    /// `post_parse` runs on the value the base placeholder parsed;
    /// `pre_format` produces the value the base placeholder formats. The
    /// wrapped placeholder keeps the base's name, label and description.
    pub fn modify(
        self,
        post_parse: impl Fn(Value) -> Result<Value, Error> + Send + Sync + 'static,
        pre_format: impl Fn(&Value) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Placeholder {
        let name = self.name.clone();
        let label = self.label.clone();
        let description = self.description.clone();
        Placeholder {
            name,
            label,
            description,
            strategy: Strategy::Modified {
                base: Box::new(self),
                post_parse: Arc::new(post_parse),
                pre_format: Arc::new(pre_format),
            },
        }
    }

    /// Returns the name of this placeholder, i.e. its record key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label used in error messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the description of this placeholder.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parses a value from the start of `input`, returning it along with
    /// the unconsumed remainder.
    pub(crate) fn parse<'i>(
        &self,
        input: &'i str,
    ) -> Result<(Value, &'i str), Error> {
        match self.strategy {
            Strategy::Fixed { length } => {
                let (text, rest) = self.take_chars(input, length)?;
                Ok((Value::Str(text.to_string()), rest))
            }
            Strategy::Padded { length, fill, position, disallow_empty } => {
                let (text, rest) = self.take_chars(input, length)?;
                let trimmed = match position {
                    PadPosition::Start => text.trim_start_matches(fill),
                    PadPosition::End => text.trim_end_matches(fill),
                };
                if trimmed.is_empty() && length > 0 && disallow_empty {
                    return Err(Error::from(TemplateError::EmptyValue {
                        label: self.label.clone().into_boxed_str(),
                    }));
                }
                Ok((Value::Str(trimmed.to_string()), rest))
            }
            Strategy::FixedNumeric { length, fill, ref options } => {
                let (text, rest) = self.take_chars(input, length)?;
                let value = self.parse_filled_number(text, fill, options)?;
                Ok((Value::Int(value), rest))
            }
            Strategy::Numeric { ref options } => {
                let (value, rest) = options::parse_numeric(input, options)
                    .with_context(|| {
                        err!("failed to parse number for '{}'", self.label)
                    })?;
                Ok((Value::Int(value), rest))
            }
            Strategy::LiteralMap { ref entries } => {
                for (literal, value) in entries {
                    if let Some(rest) = input.strip_prefix(literal.as_str())
                    {
                        return Ok((value.clone(), rest));
                    }
                }
                Err(Error::from(TemplateError::NoLiteralMatch {
                    label: self.label.clone().into_boxed_str(),
                    literals: entries
                        .iter()
                        .map(|(literal, _)| {
                            literal.clone().into_boxed_str()
                        })
                        .collect(),
                    actual: input.to_string().into_boxed_str(),
                }))
            }
            Strategy::Regex { ref pattern, ref source } => {
                match pattern.find(input) {
                    Some(found) => {
                        let rest = &input[found.end()..];
                        Ok((Value::Str(found.as_str().to_string()), rest))
                    }
                    None => Err(Error::from(TemplateError::RegexParse {
                        label: self.label.clone().into_boxed_str(),
                        pattern: source.clone().into_boxed_str(),
                        actual: input.to_string().into_boxed_str(),
                    })),
                }
            }
            Strategy::Modified { ref base, ref post_parse, .. } => {
                let (value, rest) = base.parse(input)?;
                Ok((post_parse(value)?, rest))
            }
        }
    }

    /// Formats the given value.
    pub(crate) fn format(&self, value: &Value) -> Result<String, Error> {
        match self.strategy {
            Strategy::Fixed { length } => {
                let text = self.expect_str(value)?;
                let actual = text.chars().count();
                if actual != length {
                    return Err(self.length_format_error(length, actual));
                }
                Ok(text.to_string())
            }
            Strategy::Padded { length, fill, position, disallow_empty } => {
                let text = self.expect_str(value)?;
                let actual = text.chars().count();
                if actual > length {
                    return Err(self.length_format_error(length, actual));
                }
                if text.is_empty() && disallow_empty {
                    return Err(Error::from(TemplateError::EmptyValue {
                        label: self.label.clone().into_boxed_str(),
                    }));
                }
                let mut out = String::with_capacity(length);
                match position {
                    PadPosition::Start => {
                        out.extend(
                            core::iter::repeat(fill).take(length - actual),
                        );
                        out.push_str(text);
                    }
                    PadPosition::End => {
                        out.push_str(text);
                        out.extend(
                            core::iter::repeat(fill).take(length - actual),
                        );
                    }
                }
                Ok(out)
            }
            Strategy::FixedNumeric { length, fill, ref options } => {
                let number = self.expect_int(value)?;
                let formatted = options::format_numeric(number, options);
                let actual = formatted.chars().count();
                if actual > length {
                    return Err(self.length_format_error(length, actual));
                }
                // The fill goes between the sign and the digits.
                let (sign, digits) = match formatted.strip_prefix('-') {
                    Some(digits) => ("-", digits),
                    None => match formatted.strip_prefix('+') {
                        Some(digits) => ("+", digits),
                        None => ("", formatted.as_str()),
                    },
                };
                let mut out = String::with_capacity(length);
                out.push_str(sign);
                out.extend(
                    core::iter::repeat(fill).take(length - actual),
                );
                out.push_str(digits);
                Ok(out)
            }
            Strategy::Numeric { ref options } => {
                let number = self.expect_int(value)?;
                Ok(options::format_numeric(number, options))
            }
            Strategy::LiteralMap { ref entries } => {
                for (literal, candidate) in entries {
                    if candidate == value {
                        return Ok(literal.clone());
                    }
                }
                Err(Error::from(TemplateError::NoValueMatch {
                    label: self.label.clone().into_boxed_str(),
                    values: entries
                        .iter()
                        .map(|(_, candidate)| {
                            candidate.to_string().into_boxed_str()
                        })
                        .collect(),
                    actual: value.to_string().into_boxed_str(),
                }))
            }
            Strategy::Regex { ref pattern, ref source } => {
                let text = self.expect_str(value)?;
                let full_match = pattern
                    .find(text)
                    .map_or(false, |found| found.end() == text.len());
                if !full_match {
                    return Err(Error::from(TemplateError::RegexFormat {
                        label: self.label.clone().into_boxed_str(),
                        pattern: source.clone().into_boxed_str(),
                        actual: text.to_string().into_boxed_str(),
                    }));
                }
                Ok(text.to_string())
            }
            Strategy::Modified { ref base, ref pre_format, .. } => {
                let lowered = pre_format(value)?;
                base.format(&lowered)
            }
        }
    }

    /// Splits off exactly `length` characters, or reports a length
    /// mismatch naming how many characters actually remained.
    fn take_chars<'i>(
        &self,
        input: &'i str,
        length: usize,
    ) -> Result<(&'i str, &'i str), Error> {
        let mut count = 0;
        for (i, _) in input.char_indices() {
            if count == length {
                return Ok(input.split_at(i));
            }
            count += 1;
        }
        if count == length {
            return Ok((input, ""));
        }
        Err(Error::from(TemplateError::LengthParse {
            label: self.label.clone().into_boxed_str(),
            expected: length,
            actual: count,
        }))
    }

    /// Parses a fixed-length slice as a number, trimming the fill
    /// character between sign and digits. The whole slice must be
    /// consumed.
    fn parse_filled_number(
        &self,
        text: &str,
        fill: char,
        options: &NumericFormatOptions,
    ) -> Result<i64, Error> {
        let (sign, body) = match text.strip_prefix('-') {
            Some(body) => ("-", body),
            None => match text.strip_prefix('+') {
                Some(body) => ("+", body),
                None => ("", text),
            },
        };
        let mut trimmed = body.trim_start_matches(fill);
        // An all-fill body of zeros is the number zero.
        if trimmed.is_empty() && fill == '0' && !body.is_empty() {
            trimmed = "0";
        }
        let composed = format!("{sign}{trimmed}");
        let (value, rest) = options::parse_numeric(&composed, options)
            .with_context(|| {
                err!("failed to parse number for '{}'", self.label)
            })?;
        if !rest.is_empty() {
            return Err(Error::from(TemplateError::NumericSlice {
                label: self.label.clone().into_boxed_str(),
                actual: text.to_string().into_boxed_str(),
            }));
        }
        Ok(value)
    }

    fn expect_str<'v>(&self, value: &'v Value) -> Result<&'v str, Error> {
        match value {
            Value::Str(text) => Ok(text),
            Value::Int(_) => Err(Error::from(TemplateError::WrongType {
                label: self.label.clone().into_boxed_str(),
                expected: "a string",
            })),
        }
    }

    fn expect_int(&self, value: &Value) -> Result<i64, Error> {
        match *value {
            Value::Int(number) => Ok(number),
            Value::Str(_) => Err(Error::from(TemplateError::WrongType {
                label: self.label.clone().into_boxed_str(),
                expected: "an integer",
            })),
        }
    }

    fn length_format_error(&self, expected: usize, actual: usize) -> Error {
        Error::from(TemplateError::LengthFormat {
            label: self.label.clone().into_boxed_str(),
            expected,
            actual,
        })
    }
}

impl core::fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let strategy = match self.strategy {
            Strategy::Fixed { .. } => "fixed",
            Strategy::Padded { .. } => "padded",
            Strategy::FixedNumeric { .. } => "fixed-numeric",
            Strategy::Numeric { .. } => "numeric",
            Strategy::LiteralMap { .. } => "literal-map",
            Strategy::Regex { .. } => "regex",
            Strategy::Modified { .. } => "modified",
        };
        f.debug_struct("Placeholder")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("strategy", &strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::options::SignDisplay;

    #[test]
    fn fixed_length() {
        let dd = Placeholder::fixed("dd", 2);
        assert_eq!(
            dd.parse("25|").unwrap(),
            (Value::Str("25".to_string()), "|"),
        );
        let err = dd.parse("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected length of 'dd' to be: 2. Actual: 0",
        );
        let err = dd.parse("5").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected length of 'dd' to be: 2. Actual: 1",
        );

        assert_eq!(
            dd.format(&Value::Str("25".to_string())).unwrap(),
            "25",
        );
        let err = dd.format(&Value::Str("255".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected length of 'dd' placeholder to be: 2. Actual: 3",
        );
    }

    #[test]
    fn padded() {
        let field = Placeholder::padded(
            "code",
            4,
            ' ',
            PadPosition::Start,
            false,
        );
        assert_eq!(
            field.parse("  ab!").unwrap(),
            (Value::Str("ab".to_string()), "!"),
        );
        assert_eq!(
            field.parse("    ").unwrap(),
            (Value::Str(String::new()), ""),
        );
        assert_eq!(
            field.format(&Value::Str("ab".to_string())).unwrap(),
            "  ab",
        );

        let strict = Placeholder::padded(
            "code",
            4,
            ' ',
            PadPosition::Start,
            true,
        );
        let err = strict.parse("    ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected non-empty text for 'code'. Actual: ''",
        );

        let end = Placeholder::padded("code", 4, '-', PadPosition::End, false);
        assert_eq!(
            end.parse("ab--").unwrap(),
            (Value::Str("ab".to_string()), ""),
        );
        assert_eq!(
            end.format(&Value::Str("ab".to_string())).unwrap(),
            "ab--",
        );
    }

    #[test]
    fn fixed_numeric() {
        let year = Placeholder::fixed_numeric(
            "year",
            4,
            '0',
            NumericFormatOptions::new(),
        );
        assert_eq!(
            year.parse("2024-07").unwrap(),
            (Value::Int(2024), "-07"),
        );
        assert_eq!(year.parse("0007").unwrap(), (Value::Int(7), ""));
        assert_eq!(year.parse("0000").unwrap(), (Value::Int(0), ""));
        assert_eq!(year.format(&Value::Int(7)).unwrap(), "0007");
        assert_eq!(year.format(&Value::Int(2024)).unwrap(), "2024");

        let err = year.format(&Value::Int(10024)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected length of 'year' placeholder to be: 4. Actual: 5",
        );

        // Signed, with the fill between sign and digits.
        let offset = Placeholder::fixed_numeric(
            "offset",
            3,
            '0',
            NumericFormatOptions::new().sign(SignDisplay::Always),
        );
        assert_eq!(offset.parse("+05").unwrap(), (Value::Int(5), ""));
        assert_eq!(offset.parse("-12").unwrap(), (Value::Int(-12), ""));
        assert_eq!(offset.format(&Value::Int(-5)).unwrap(), "-05");
        assert_eq!(offset.format(&Value::Int(5)).unwrap(), "+05");
    }

    #[test]
    fn fixed_numeric_rejects_junk() {
        let year = Placeholder::fixed_numeric(
            "year",
            4,
            '0',
            NumericFormatOptions::new(),
        );
        assert!(year.parse("20x4").is_err());
        assert!(year.parse("abcd").is_err());
    }

    #[test]
    fn free_form_numeric() {
        let month = Placeholder::numeric(
            "month",
            NumericFormatOptions::new().sign(SignDisplay::Never),
        );
        assert_eq!(month.parse("7/14").unwrap(), (Value::Int(7), "/14"));
        assert_eq!(month.parse("12").unwrap(), (Value::Int(12), ""));
        assert!(month.parse("/7").is_err());
        assert_eq!(month.format(&Value::Int(7)).unwrap(), "7");
    }

    #[test]
    fn literal_map_first_match_wins() {
        let meridiem = Placeholder::literal_map(
            "meridiem",
            [
                ("AM".to_string(), Value::Int(0)),
                ("PM".to_string(), Value::Int(12)),
            ],
        );
        assert_eq!(meridiem.parse("PM!").unwrap(), (Value::Int(12), "!"));
        let err = meridiem.parse("XX").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected remaining text for 'meridiem' to start with \
             one of: 'AM', 'PM'. Actual: 'XX'",
        );
        assert_eq!(meridiem.format(&Value::Int(0)).unwrap(), "AM");
        let err = meridiem.format(&Value::Int(7)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected value of 'meridiem' to be one of: '0', '12'. \
             Actual: '7'",
        );

        // Table order decides ambiguous prefixes: "M" before "Mon" means
        // "M" always captures.
        let sloppy = Placeholder::literal_map(
            "day",
            [
                ("M".to_string(), Value::Int(1)),
                ("Mon".to_string(), Value::Int(10)),
            ],
        );
        assert_eq!(sloppy.parse("Mon").unwrap(), (Value::Int(1), "on"));
    }

    #[test]
    fn bounded_regex() {
        let word = Placeholder::regex("word", "[a-z]+").unwrap();
        assert_eq!(
            word.parse("abc123").unwrap(),
            (Value::Str("abc".to_string()), "123"),
        );
        let err = word.parse("123").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected remaining text for 'word' to match /[a-z]+/. \
             Actual: '123'",
        );

        assert_eq!(
            word.format(&Value::Str("abc".to_string())).unwrap(),
            "abc",
        );
        // The whole value must match, not just a prefix.
        let err = word.format(&Value::Str("abc123".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected formatted value of 'word' to match /[a-z]+/ \
             entirely. Actual: 'abc123'",
        );

        assert!(Placeholder::regex("broken", "[a-z").is_err());
    }

    #[test]
    fn modify_two_digit_year() {
        let yy = Placeholder::fixed_numeric(
            "year",
            2,
            '0',
            NumericFormatOptions::new().sign(SignDisplay::Never),
        )
        .modify(
            |value| match value {
                Value::Int(two) => Ok(Value::Int(two + 2000)),
                value => Ok(value),
            },
            |value| match *value {
                Value::Int(year) if (2000..=2099).contains(&year) => {
                    Ok(Value::Int(year - 2000))
                }
                Value::Int(year) => {
                    Err(Error::range("year", year, 2000, 2099))
                }
                ref value => Ok(value.clone()),
            },
        );
        assert_eq!(yy.name(), "year");
        assert_eq!(yy.parse("24").unwrap(), (Value::Int(2024), ""));
        assert_eq!(yy.format(&Value::Int(2024)).unwrap(), "24");
        assert_eq!(yy.format(&Value::Int(2007)).unwrap(), "07");
        let err = yy.format(&Value::Int(1999)).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn wrong_value_type() {
        let dd = Placeholder::fixed("dd", 2);
        let err = dd.format(&Value::Int(25)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected value of 'dd' to be a string",
        );
        let n = Placeholder::numeric("n", NumericFormatOptions::new());
        let err = n.format(&Value::Str("25".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected value of 'n' to be an integer",
        );
    }
}
