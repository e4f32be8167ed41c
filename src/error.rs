use std::sync::Arc;

/// Creates a new ad hoc [`Error`] value from format arguments.
///
/// Most errors in this crate are structured, but resolution routines that
/// need to describe a specific combination of inputs (for example,
/// inconsistent fields given to `DateTime::from_parts`) build their message
/// directly.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::adhoc(format_args!($($tt)*))
    }}
}

/// An error that can occur in this crate.
///
/// The most common sources are template parse/format failures and calendar
/// fields that are out of range. This crate follows the "one error type"
/// pattern: every fallible operation returns this type, and errors compose
/// by chaining context.
///
/// The `Display` implementation writes the full chain, highest level
/// context first, separated by `: `. Callers are expected to display the
/// message verbatim.
#[derive(Clone)]
pub struct Error {
    /// `Arc` makes clones cheap and keeps the error one word wide. The
    /// cause chain is a linked list, never a tree.
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

/// The underlying kind of an [`Error`].
#[derive(Debug)]
pub(crate) enum ErrorKind {
    Adhoc(AdhocError),
    Range(RangeError),
    Template(crate::template::TemplateError),
    Numeric(crate::template::options::NumericError),
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`. Use through
    /// the `err!` macro.
    #[inline(never)]
    #[cold]
    pub(crate) fn adhoc(message: core::fmt::Arguments<'_>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError {
            message: message.to_string().into_boxed_str(),
        }))
    }

    /// Creates a new error indicating that a `given` value is out of the
    /// specified `min..=max` range. The given `what` label is used in the
    /// error message as a human readable description of what exactly is
    /// out of range. (e.g., "month")
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> Error {
        Error::from(ErrorKind::Range(RangeError {
            what,
            given: given.into(),
            min: min.into(),
            max: max.into(),
        }))
    }

    /// Returns true when this error originated from a value being out of
    /// range.
    pub fn is_range(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Range(_))
    }

    /// Returns true when this error originated from a duplicated template
    /// placeholder whose occurrences parsed to different values.
    pub fn is_conflict(&self) -> bool {
        matches!(
            *self.root().kind(),
            ErrorKind::Template(crate::template::TemplateError::Conflict {
                ..
            })
        )
    }

    pub(crate) fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, mut consequent: Error) -> Error {
        {
            let inner = Arc::get_mut(&mut consequent.inner)
                .expect("consequent error must be freshly constructed");
            assert!(
                inner.cause.is_none(),
                "cause of consequence must be `None`"
            );
            inner.cause = Some(self);
        }
        consequent
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        // OK because `Error::chain` always yields at least one error.
        self.chain().last().unwrap()
    }

    /// Returns a chain of error values, starting with the highest level
    /// context and ending with the root cause.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Adhoc(ref err) => err.fmt(f),
            ErrorKind::Range(ref err) => err.fmt(f),
            ErrorKind::Template(ref err) => err.fmt(f),
            ErrorKind::Numeric(ref err) => err.fmt(f),
        }
    }
}

/// A generic error message.
pub(crate) struct AdhocError {
    message: Box<str>,
}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error that occurs when an input value is out of bounds.
///
/// The message names the input that was out of bounds, the value given and
/// its minimum and maximum allowed values.
#[derive(Debug)]
pub(crate) struct RangeError {
    what: &'static str,
    given: i64,
    min: i64,
    max: i64,
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, given, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {given} \
             is not in the required range of {min}..={max}",
        )
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This exists so `Error::context` and `ErrorContext` work without public
/// `From` impls for every structured error enum in the crate.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or
/// `Result<T, Error>` without calling `map_err` everywhere.
pub(crate) trait ErrorContext<T> {
    /// Contextualize the given consequent error with this (`self`) error
    /// as the cause.
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure, so
    /// the happy path doesn't pay for building the contextual error.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E: IntoError> ErrorContext<T> for Result<T, E> {
    #[inline(always)]
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    #[inline(always)]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}

impl IntoError for &'static str {
    fn into_error(self) -> Error {
        Error::adhoc(format_args!("{self}"))
    }
}

impl IntoError for String {
    fn into_error(self) -> Error {
        Error::adhoc(format_args!("{self}"))
    }
}
