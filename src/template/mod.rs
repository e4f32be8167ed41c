/*!
A bidirectional template engine: ordered placeholders and literal
separators that jointly parse a string into typed fields and format typed
fields back into a string.

A [`Template`] is an ordered sequence of parts. Parsing is strictly
sequential and left-to-right greedy: each part consumes exactly the prefix
it is defined to consume before the next part runs, with no backtracking.
Parsed values land in a [`Record`] keyed by placeholder name; formatting
walks the same parts in order and concatenates their output.

# Example

```
use timeform::template::{
    options::NumericFormatOptions, Placeholder, Separator, Template,
};

let template = Template::new(vec![
    Placeholder::fixed_numeric("day", 2, '0', NumericFormatOptions::new())
        .into(),
    Separator::new("/").into(),
    Placeholder::fixed_numeric("month", 2, '0', NumericFormatOptions::new())
        .into(),
]);

let record = template.parse("25/12")?;
assert_eq!(record.int("day"), Some(25));
assert_eq!(record.int("month"), Some(12));
assert_eq!(template.format(&record)?, "25/12");

# Ok::<(), timeform::Error>(())
```

# Duplicate placeholders

The same name may occur more than once in a template. On parse, all
occurrences must produce equal values or the parse fails with a conflict
error naming both observed representations. On format, the same value is
emitted at every occurrence.
*/

use std::collections::BTreeMap;

use crate::{
    error::{self, Error, ErrorKind},
    util::escape,
};

pub use self::{
    placeholder::{PadPosition, Placeholder},
    separator::Separator,
};

pub mod options;
mod placeholder;
mod separator;

/// A typed field value: what placeholders parse and format.
///
/// Equality on values is what backs duplicate-placeholder conflict
/// detection, and the `Display` implementation is the representation
/// conflict errors quote.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Value::Int(number) => write!(f, "{number}"),
            Value::Str(ref text) => f.write_str(text),
        }
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Value {
        Value::Int(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Str(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Value {
        Value::Str(text)
    }
}

/// The result of a parse and the input of a format: a mapping from
/// placeholder name to its value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Record {
        Record::default()
    }

    /// Returns the value for the given placeholder name, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets the value for the given placeholder name, replacing any
    /// previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the integer value for the given name, if present and an
    /// integer.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(&Value::Int(number)) => Some(number),
            _ => None,
        }
    }

    /// Returns the string value for the given name, if present and a
    /// string.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::Str(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns an iterator over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One part of a template: either a literal separator or a named
/// placeholder.
#[derive(Clone, Debug)]
pub enum Part {
    Separator(Separator),
    Placeholder(Placeholder),
}

impl From<Separator> for Part {
    fn from(separator: Separator) -> Part {
        Part::Separator(separator)
    }
}

impl From<Placeholder> for Part {
    fn from(placeholder: Placeholder) -> Part {
        Part::Placeholder(placeholder)
    }
}

/// An ordered placeholder/separator sequence defining a bidirectional
/// string to record mapping.
#[derive(Clone, Debug)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Creates a template from its parts, in order.
    pub fn new(parts: Vec<Part>) -> Template {
        Template { parts }
    }

    /// Returns the parts of this template.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Parses `input` against this template.
    ///
    /// Parts run strictly left to right; each consumes exactly its own
    /// prefix of the remaining input. The first failure aborts the parse
    /// (no partial result). After the last part, the input must be fully
    /// consumed.
    ///
    /// # Errors
    ///
    /// Any part can fail with its own structured error. In addition, a
    /// placeholder name occurring more than once fails with a conflict
    /// error if the occurrences parse to different values, and trailing
    /// text after the last part fails with an unconsumed-input error.
    pub fn parse(&self, input: &str) -> Result<Record, Error> {
        let mut record = Record::new();
        let mut rest = input;
        for (index, part) in self.parts.iter().enumerate() {
            match part {
                Part::Separator(separator) => {
                    rest = separator.parse_at(index + 1, rest)?;
                }
                Part::Placeholder(placeholder) => {
                    let (value, unconsumed) = placeholder.parse(rest)?;
                    rest = unconsumed;
                    match record.get(placeholder.name()) {
                        None => record.set(placeholder.name(), value),
                        Some(existing) if *existing == value => {}
                        Some(existing) => {
                            return Err(Error::from(
                                TemplateError::Conflict {
                                    name: placeholder
                                        .name()
                                        .to_string()
                                        .into_boxed_str(),
                                    first: existing
                                        .to_string()
                                        .into_boxed_str(),
                                    second: value
                                        .to_string()
                                        .into_boxed_str(),
                                },
                            ));
                        }
                    }
                }
            }
        }
        if !rest.is_empty() {
            return Err(Error::from(TemplateError::Unconsumed {
                remaining: rest.to_string().into_boxed_str(),
            }));
        }
        Ok(record)
    }

    /// Formats `record` against this template.
    ///
    /// Parts are concatenated in order; a placeholder looks up its value
    /// by name. The first failure aborts the format (no partial result).
    /// A name occurring more than once emits the same value at every
    /// occurrence.
    pub fn format(&self, record: &Record) -> Result<String, Error> {
        let mut out = String::new();
        for part in self.parts.iter() {
            match part {
                Part::Separator(separator) => {
                    out.push_str(separator.format());
                }
                Part::Placeholder(placeholder) => {
                    let value =
                        record.get(placeholder.name()).ok_or_else(|| {
                            Error::from(TemplateError::MissingField {
                                name: placeholder
                                    .name()
                                    .to_string()
                                    .into_boxed_str(),
                            })
                        })?;
                    out.push_str(&placeholder.format(value)?);
                }
            }
        }
        Ok(out)
    }
}

/// A structured template engine failure.
#[derive(Clone, Debug)]
pub(crate) enum TemplateError {
    Separator {
        position: usize,
        literal: Box<str>,
        actual: Box<str>,
    },
    LengthParse {
        label: Box<str>,
        expected: usize,
        actual: usize,
    },
    LengthFormat {
        label: Box<str>,
        expected: usize,
        actual: usize,
    },
    Conflict {
        name: Box<str>,
        first: Box<str>,
        second: Box<str>,
    },
    Unconsumed {
        remaining: Box<str>,
    },
    MissingField {
        name: Box<str>,
    },
    EmptyValue {
        label: Box<str>,
    },
    NoLiteralMatch {
        label: Box<str>,
        literals: Box<[Box<str>]>,
        actual: Box<str>,
    },
    NoValueMatch {
        label: Box<str>,
        values: Box<[Box<str>]>,
        actual: Box<str>,
    },
    RegexParse {
        label: Box<str>,
        pattern: Box<str>,
        actual: Box<str>,
    },
    RegexFormat {
        label: Box<str>,
        pattern: Box<str>,
        actual: Box<str>,
    },
    NumericSlice {
        label: Box<str>,
        actual: Box<str>,
    },
    WrongType {
        label: Box<str>,
        expected: &'static str,
    },
}

impl error::IntoError for TemplateError {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl From<TemplateError> for Error {
    #[cold]
    #[inline(never)]
    fn from(err: TemplateError) -> Error {
        ErrorKind::Template(err).into()
    }
}

impl core::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::TemplateError::*;

        match *self {
            Separator { position, ref literal, ref actual } => write!(
                f,
                "Expected remaining text for separator at position \
                 {position} to start with '{literal}'. Actual: '{actual}'",
                actual = escape::Str(actual),
            ),
            LengthParse { ref label, expected, actual } => write!(
                f,
                "Expected length of '{label}' to be: {expected}. \
                 Actual: {actual}",
            ),
            LengthFormat { ref label, expected, actual } => write!(
                f,
                "Expected length of '{label}' placeholder to be: \
                 {expected}. Actual: {actual}",
            ),
            Conflict { ref name, ref first, ref second } => write!(
                f,
                "Expected equal values for duplicate placeholder \
                 '{name}'. Actual: '{first}' vs '{second}'",
                first = escape::Str(first),
                second = escape::Str(second),
            ),
            Unconsumed { ref remaining } => write!(
                f,
                "text not consumed by template: '{remaining}'",
                remaining = escape::Str(remaining),
            ),
            MissingField { ref name } => write!(
                f,
                "no value for placeholder '{name}' in record",
            ),
            EmptyValue { ref label } => write!(
                f,
                "Expected non-empty text for '{label}'. Actual: ''",
            ),
            NoLiteralMatch { ref label, ref literals, ref actual } => {
                write!(
                    f,
                    "Expected remaining text for '{label}' to start \
                     with one of: ",
                )?;
                for (i, literal) in literals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{literal}'")?;
                }
                write!(f, ". Actual: '{actual}'", actual = escape::Str(actual))
            }
            NoValueMatch { ref label, ref values, ref actual } => {
                write!(f, "Expected value of '{label}' to be one of: ")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{value}'")?;
                }
                write!(f, ". Actual: '{actual}'", actual = escape::Str(actual))
            }
            RegexParse { ref label, ref pattern, ref actual } => write!(
                f,
                "Expected remaining text for '{label}' to match \
                 /{pattern}/. Actual: '{actual}'",
                actual = escape::Str(actual),
            ),
            RegexFormat { ref label, ref pattern, ref actual } => write!(
                f,
                "Expected formatted value of '{label}' to match \
                 /{pattern}/ entirely. Actual: '{actual}'",
                actual = escape::Str(actual),
            ),
            NumericSlice { ref label, ref actual } => write!(
                f,
                "Expected '{label}' to contain a number. \
                 Actual: '{actual}'",
                actual = escape::Str(actual),
            ),
            WrongType { ref label, expected } => write!(
                f,
                "Expected value of '{label}' to be {expected}",
            ),
        }
    }
}
