/*!
Numeric formatting options consumed by numeric placeholders.

These are small enumerated strategy objects: how to display a sign, how to
round a fractional result into an integer field, and whether scientific
notation is recognized. Everything in here is a pure function of its
inputs.
*/

use crate::error::{self, Error, ErrorKind};

/// When to emit (and require) a sign on a formatted number.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SignDisplay {
    /// A sign is emitted only for negative values. Parsing accepts an
    /// optional sign.
    Auto,
    /// A sign is always emitted, `+` for zero. Parsing requires a sign.
    Always,
    /// A sign is emitted for everything except zero. Parsing accepts an
    /// optional sign.
    ExceptZero,
    /// No sign is ever emitted. Parsing does not recognize signs.
    Never,
}

/// The mode for dealing with the remainder when a parsed number has a
/// fractional part that must collapse into an integer field.
///
/// The vocabulary (and semantics) are the conventional nine: three pairs
/// around zero and infinity, and the five "half" modes for ties.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RoundMode {
    /// Rounds toward positive infinity.
    Ceil,
    /// Rounds toward negative infinity.
    Floor,
    /// Rounds away from zero.
    Expand,
    /// Rounds toward zero, chopping off the fractional part.
    Trunc,
    /// Rounds to the nearest value, with ties toward positive infinity.
    HalfCeil,
    /// Rounds to the nearest value, with ties toward negative infinity.
    HalfFloor,
    /// Rounds to the nearest value, with ties away from zero. This is how
    /// you were taught to round in school.
    HalfExpand,
    /// Rounds to the nearest value, with ties toward zero.
    HalfTrunc,
    /// Rounds to the nearest value, with ties toward the even value.
    /// Also known as banker's rounding.
    HalfEven,
}

impl RoundMode {
    /// Rounds the exact quotient `numerator / denominator` to an integer
    /// according to this mode.
    ///
    /// # Panics
    ///
    /// When `denominator` is not positive.
    pub fn round(self, numerator: i64, denominator: i64) -> i64 {
        assert!(denominator > 0, "denominator must be positive");
        self.round128(i128::from(numerator), i128::from(denominator)) as i64
    }

    /// The `i128` worker behind `round`. `d` must be positive.
    pub(crate) fn round128(self, n: i128, d: i128) -> i128 {
        let q = n.div_euclid(d);
        let r = n.rem_euclid(d);
        if r == 0 {
            return q;
        }
        // `q` is the floor; `q + 1` is the ceiling. `r` is in `(0, d)`.
        let up = q + 1;
        let down = q;
        let toward_zero = if n >= 0 { down } else { up };
        let away_from_zero = if n >= 0 { up } else { down };
        match self {
            RoundMode::Ceil => up,
            RoundMode::Floor => down,
            RoundMode::Expand => away_from_zero,
            RoundMode::Trunc => toward_zero,
            RoundMode::HalfCeil => {
                if 2 * r >= d {
                    up
                } else {
                    down
                }
            }
            RoundMode::HalfFloor => {
                if 2 * r > d {
                    up
                } else {
                    down
                }
            }
            RoundMode::HalfExpand => {
                if 2 * r > d || (2 * r == d && n >= 0) {
                    up
                } else {
                    down
                }
            }
            RoundMode::HalfTrunc => {
                if 2 * r > d || (2 * r == d && n < 0) {
                    up
                } else {
                    down
                }
            }
            RoundMode::HalfEven => {
                if 2 * r > d || (2 * r == d && q % 2 != 0) {
                    up
                } else {
                    down
                }
            }
        }
    }
}

/// Whether numbers are written plainly or in scientific notation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Notation {
    /// Plain decimal digits. An exponent in the input is not recognized.
    Standard,
    /// Scientific notation: formatting yields a normalized `m.mmm e k`
    /// form, and parsing accepts an optional `e`/`E` exponent.
    Scientific,
}

/// The numeric strategy a numeric placeholder parses and formats with.
///
/// Construction is by builder, and everything is `const`:
///
/// ```
/// use timeform::template::options::{
///     Notation, NumericFormatOptions, SignDisplay,
/// };
///
/// const OPTS: NumericFormatOptions = NumericFormatOptions::new()
///     .sign(SignDisplay::Always)
///     .notation(Notation::Standard);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct NumericFormatOptions {
    pub(crate) sign: SignDisplay,
    pub(crate) round: RoundMode,
    pub(crate) notation: Notation,
    pub(crate) group_separator: Option<char>,
    pub(crate) decimal_separator: char,
}

impl NumericFormatOptions {
    /// The default configuration: optional sign, school rounding, plain
    /// notation, no digit grouping, `.` as the decimal separator.
    pub const fn new() -> NumericFormatOptions {
        NumericFormatOptions {
            sign: SignDisplay::Auto,
            round: RoundMode::HalfExpand,
            notation: Notation::Standard,
            group_separator: None,
            decimal_separator: '.',
        }
    }

    /// Sets the sign display policy.
    pub const fn sign(self, sign: SignDisplay) -> NumericFormatOptions {
        NumericFormatOptions { sign, ..self }
    }

    /// Sets the rounding mode used when parsed input carries a fractional
    /// part.
    pub const fn round(self, round: RoundMode) -> NumericFormatOptions {
        NumericFormatOptions { round, ..self }
    }

    /// Sets the notation policy.
    pub const fn notation(self, notation: Notation) -> NumericFormatOptions {
        NumericFormatOptions { notation, ..self }
    }

    /// Sets the digit grouping separator recognized between digits on
    /// parse and inserted every three digits on format.
    pub const fn group_separator(
        self,
        sep: Option<char>,
    ) -> NumericFormatOptions {
        NumericFormatOptions { group_separator: sep, ..self }
    }

    /// Sets the decimal separator. The default is `.`.
    pub const fn decimal_separator(self, sep: char) -> NumericFormatOptions {
        NumericFormatOptions { decimal_separator: sep, ..self }
    }
}

impl Default for NumericFormatOptions {
    fn default() -> NumericFormatOptions {
        NumericFormatOptions::new()
    }
}

/// A numeric parse failure.
#[derive(Clone, Debug)]
pub(crate) enum NumericError {
    NoDigits,
    TooBig,
    MissingSign,
}

impl error::IntoError for NumericError {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl From<NumericError> for Error {
    #[cold]
    #[inline(never)]
    fn from(err: NumericError) -> Error {
        ErrorKind::Numeric(err).into()
    }
}

impl core::fmt::Display for NumericError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            NumericError::NoDigits => f.write_str(
                "expected at least one decimal digit, but did not find any",
            ),
            NumericError::TooBig => f.write_str(
                "number is too big to parse into a 64-bit integer",
            ),
            NumericError::MissingSign => f.write_str(
                "expected a leading sign ('+' or '-'), \
                 but did not find one",
            ),
        }
    }
}

/// At most this many fractional digits are consumed by a parse. Enough
/// for anything a template will meet, and it keeps the intermediate
/// mantissa comfortably inside an `i128`.
const MAX_FRACTION_DIGITS: usize = 18;

/// Greedily parses the longest numeric prefix of `input` permitted by the
/// given options. Returns the (rounded) integer value and the remaining
/// input.
pub(crate) fn parse_numeric<'i>(
    input: &'i str,
    options: &NumericFormatOptions,
) -> Result<(i64, &'i str), Error> {
    let (sign, rest) = match options.sign {
        SignDisplay::Never => (1i128, input),
        SignDisplay::Always => match input.chars().next() {
            Some('-') => (-1, &input[1..]),
            Some('+') => (1, &input[1..]),
            _ => return Err(Error::from(NumericError::MissingSign)),
        },
        SignDisplay::Auto | SignDisplay::ExceptZero => {
            match input.chars().next() {
                Some('-') => (-1, &input[1..]),
                Some('+') => (1, &input[1..]),
                _ => (1, input),
            }
        }
    };

    let (mut mantissa, digits, rest) =
        parse_digit_run(rest, options.group_separator, usize::MAX)?;
    if digits == 0 {
        return Err(Error::from(NumericError::NoDigits));
    }

    // Fractional digits fold into the mantissa; the scale is folded into
    // the exponent below.
    let mut scale = 0i32;
    let mut rest = rest;
    let mut chars = rest.chars();
    if chars.next() == Some(options.decimal_separator)
        && chars.clone().next().map_or(false, |c| c.is_ascii_digit())
    {
        let after_sep = chars.as_str();
        let (frac, frac_digits, after_frac) =
            parse_digit_run(after_sep, None, MAX_FRACTION_DIGITS)?;
        mantissa = mantissa
            .checked_mul(pow10(frac_digits as i32)?)
            .and_then(|m| m.checked_add(frac))
            .ok_or(NumericError::TooBig)?;
        scale = frac_digits as i32;
        rest = after_frac;
    }

    let mut exponent = 0i32;
    if matches!(options.notation, Notation::Scientific) {
        let mut echars = rest.chars();
        if matches!(echars.next(), Some('e') | Some('E')) {
            let (esign, etail) =
                crate::util::parse::optional_sign(echars.as_str());
            let (evalue, edigits, after_exp) =
                crate::util::parse::digits(etail, 9)?;
            if edigits > 0 {
                exponent = (esign * evalue) as i32;
                rest = after_exp;
            }
        }
    }

    let signed = sign * mantissa;
    let net = exponent - scale;
    let value = if signed == 0 {
        0
    } else if net >= 0 {
        signed.checked_mul(pow10(net)?).ok_or(NumericError::TooBig)?
    } else if -net > 38 {
        // The value is vanishingly small; only its sign and the rounding
        // mode matter.
        round_tiny(options.round, signed)
    } else {
        options.round.round128(signed, pow10(-net)?)
    };
    let value = i64::try_from(value).map_err(|_| NumericError::TooBig)?;
    Ok((value, rest))
}

/// Accumulates a digit run (possibly with grouping separators) into an
/// `i128`. Returns the value, the digit count and the remaining input.
fn parse_digit_run(
    input: &str,
    group_separator: Option<char>,
    max_digits: usize,
) -> Result<(i128, usize, &str), Error> {
    let mut n: i128 = 0;
    let mut digits = 0;
    let mut iter = input.char_indices().peekable();
    let mut end = 0;
    while let Some(&(i, ch)) = iter.peek() {
        if ch.is_ascii_digit() && digits < max_digits {
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(i128::from(ch as u8 - b'0')))
                .ok_or(NumericError::TooBig)?;
            digits += 1;
            iter.next();
            end = i + ch.len_utf8();
        } else if digits > 0
            && Some(ch) == group_separator
            && input[i + ch.len_utf8()..]
                .chars()
                .next()
                .map_or(false, |next| next.is_ascii_digit())
        {
            // A grouping separator counts only between digits.
            iter.next();
            end = i + ch.len_utf8();
        } else {
            break;
        }
    }
    Ok((n, digits, &input[end..]))
}

/// Rounds a value of magnitude strictly between 0 and 1 (represented only
/// by its sign) to an integer.
fn round_tiny(mode: RoundMode, sign_of: i128) -> i128 {
    match mode {
        RoundMode::Ceil => {
            if sign_of > 0 {
                1
            } else {
                0
            }
        }
        RoundMode::Floor => {
            if sign_of < 0 {
                -1
            } else {
                0
            }
        }
        RoundMode::Expand => {
            if sign_of > 0 {
                1
            } else {
                -1
            }
        }
        _ => 0,
    }
}

fn pow10(exp: i32) -> Result<i128, NumericError> {
    let mut n: i128 = 1;
    let mut i = 0;
    while i < exp {
        n = n.checked_mul(10).ok_or(NumericError::TooBig)?;
        i += 1;
    }
    Ok(n)
}

/// Formats `value` according to the given options.
pub(crate) fn format_numeric(
    value: i64,
    options: &NumericFormatOptions,
) -> String {
    let sign = match options.sign {
        SignDisplay::Auto => {
            if value < 0 {
                "-"
            } else {
                ""
            }
        }
        SignDisplay::Always => {
            if value < 0 {
                "-"
            } else {
                "+"
            }
        }
        SignDisplay::ExceptZero => {
            if value < 0 {
                "-"
            } else if value > 0 {
                "+"
            } else {
                ""
            }
        }
        SignDisplay::Never => "",
    };
    let digits = value.unsigned_abs().to_string();
    match options.notation {
        Notation::Standard => {
            let grouped = match options.group_separator {
                None => digits,
                Some(sep) => group_digits(&digits, sep),
            };
            format!("{sign}{grouped}")
        }
        Notation::Scientific => {
            let stripped = digits.trim_end_matches('0');
            let (mantissa, zeros) = if stripped.is_empty() {
                ("0", 0)
            } else {
                (stripped, digits.len() - stripped.len())
            };
            let exponent = mantissa.len() - 1 + zeros;
            let (head, tail) = mantissa.split_at(1);
            if tail.is_empty() {
                format!("{sign}{head}e{exponent}")
            } else {
                let sep = options.decimal_separator;
                format!("{sign}{head}{sep}{tail}e{exponent}")
            }
        }
    }
}

/// Inserts the grouping separator every three digits, counting from the
/// right.
fn group_digits(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.char_indices() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
