/*!
Provides convenience routines for escaping input fragments embedded in
error messages.

This was copied from `regex-automata` with a few light edits (this crate
only ever embeds `&str` fragments, so the lossy byte decoding is gone).
*/

/// Provides a convenient `Display` implementation for a `&str` fragment.
///
/// Printable characters are emitted as-is. Control characters are emitted
/// as escape sequences so an error message stays one line no matter what
/// the input looked like.
#[derive(Clone, Copy)]
pub(crate) struct Str<'a>(pub(crate) &'a str);

impl<'a> core::fmt::Display for Str<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '\0' => write!(f, "\\0")?,
                // ASCII control characters except \0
                '\x01'..='\x1f' | '\x7f' => {
                    for esc in ch.escape_debug() {
                        write!(f, "{esc}")?;
                    }
                }
                _ => write!(f, "{ch}")?,
            }
        }
        Ok(())
    }
}

impl<'a> core::fmt::Debug for Str<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"")?;
        core::fmt::Display::fmt(self, f)?;
        write!(f, "\"")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_passthrough() {
        assert_eq!(Str("25|12").to_string(), "25|12");
        assert_eq!(Str("").to_string(), "");
    }

    #[test]
    fn control_escaped() {
        assert_eq!(Str("a\nb").to_string(), "a\\nb");
        assert_eq!(Str("\0").to_string(), "\\0");
    }
}
