use crate::{
    error::Error,
    template::TemplateError,
};

/// A literal, non-capturing template part.
///
/// A separator has no identity beyond its text: parsing checks that the
/// remaining input starts with the literal and consumes it, formatting
/// emits the literal verbatim and can never fail.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Separator {
    literal: String,
}

impl Separator {
    /// Creates a separator for the given literal text.
    pub fn new(literal: impl Into<String>) -> Separator {
        Separator { literal: literal.into() }
    }

    /// Returns the literal text of this separator.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Checks that `input` starts with this separator's literal and
    /// returns the rest. `position` is the separator's 1-based ordinal
    /// position among the template's parts; it appears in the error
    /// message so the caller can tell identical separators apart.
    pub(crate) fn parse_at<'i>(
        &self,
        position: usize,
        input: &'i str,
    ) -> Result<&'i str, Error> {
        match input.strip_prefix(self.literal.as_str()) {
            Some(rest) => Ok(rest),
            None => Err(Error::from(TemplateError::Separator {
                position,
                literal: self.literal.clone().into_boxed_str(),
                actual: input.to_string().into_boxed_str(),
            })),
        }
    }

    /// The formatted text of this separator. Always succeeds.
    pub(crate) fn format(&self) -> &str {
        &self.literal
    }
}
