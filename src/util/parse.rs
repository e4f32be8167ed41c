/*!
Small parsing helpers shared by the numeric machinery.

These operate on `&str` with the convention used throughout the crate:
a routine consumes a prefix of its input and returns the value parsed
along with the unconsumed remainder.
*/

use crate::error::Error;

/// Parses an optional leading `+`/`-` sign. If none is found, the sign
/// returned is positive. Returns the remaining unparsed input.
pub(crate) fn optional_sign(input: &str) -> (i64, &str) {
    let mut chars = input.chars();
    match chars.next() {
        Some('-') => (-1, chars.as_str()),
        Some('+') => (1, chars.as_str()),
        _ => (1, input),
    }
}

/// Accumulates a run of ASCII digits into an `i64`, with overflow
/// checking. At most `max_digits` digits are consumed. Returns the value,
/// the number of digits consumed and the remaining input.
pub(crate) fn digits(
    input: &str,
    max_digits: usize,
) -> Result<(i64, usize, &str), Error> {
    let bytes = input.as_bytes();
    let mut n: i64 = 0;
    let mut i = 0;
    while i < bytes.len() && i < max_digits && bytes[i].is_ascii_digit() {
        let digit = i64::from(bytes[i] - b'0');
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| err!("number is too big to parse into an i64"))?;
        i += 1;
    }
    Ok((n, i, &input[i..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign() {
        assert_eq!(optional_sign("-12"), (-1, "12"));
        assert_eq!(optional_sign("+12"), (1, "12"));
        assert_eq!(optional_sign("12"), (1, "12"));
        assert_eq!(optional_sign(""), (1, ""));
    }

    #[test]
    fn digit_runs() {
        let (n, len, rest) = digits("20240715", 4).unwrap();
        assert_eq!((n, len, rest), (2024, 4, "0715"));
        let (n, len, rest) = digits("7/14", 2).unwrap();
        assert_eq!((n, len, rest), (7, 1, "/14"));
        let (n, len, rest) = digits("", 2).unwrap();
        assert_eq!((n, len, rest), (0, 0, ""));
        assert!(digits("92233720368547758089", 20).is_err());
    }
}
