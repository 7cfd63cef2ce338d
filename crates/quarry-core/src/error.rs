use std::sync::Arc;

/// Returns early with an [`Error`] built from a format string.
///
/// The resulting error carries the `Adhoc` kind and is intended for
/// programmer-misuse conditions that do not fit a structured kind.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Creates an [`Error`] from a format string without returning.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in Quarry.
///
/// Errors are cheap to clone and may carry a chain of causes. Context is
/// displayed in reverse order: the most recently added context first,
/// ending with the root cause.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    /// Free-form error created via `bail!` / `err!`.
    Adhoc(String),

    /// Bridge for foreign errors.
    Anyhow(anyhow::Error),

    /// Zero rows matched an `..._or_fail` terminal.
    RecordNotFound(String),

    /// A relationship source record lacks its local key.
    MissingKey(String),

    /// A compiler invariant was violated (empty pipeline, offset without
    /// limit, untranslatable raw fragment). Programmer misuse; never
    /// retried.
    Expression(String),

    /// A transaction callback failed. The transaction was rolled back and
    /// the callback's error is attached as the cause.
    Transaction(String),

    /// Connection or driver-level failure, surfaced unmodified.
    Adapter(anyhow::Error),
}

impl Error {
    #[doc(hidden)]
    pub fn from_args(args: std::fmt::Arguments<'_>) -> Self {
        ErrorKind::Adhoc(args.to_string()).into()
    }

    pub fn record_not_found(msg: impl Into<String>) -> Self {
        ErrorKind::RecordNotFound(msg.into()).into()
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        ErrorKind::MissingKey(key.into()).into()
    }

    pub fn expression(msg: impl Into<String>) -> Self {
        ErrorKind::Expression(msg.into()).into()
    }

    pub fn transaction(msg: impl Into<String>) -> Self {
        ErrorKind::Transaction(msg.into()).into()
    }

    pub fn adapter(err: impl Into<anyhow::Error>) -> Self {
        ErrorKind::Adapter(err.into()).into()
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::RecordNotFound(_))
    }

    pub fn is_missing_key(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::MissingKey(_))
    }

    pub fn is_expression(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Expression(_))
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Transaction(_))
    }

    pub fn is_adapter(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Adapter(_))
    }

    /// Adds context to this error, making `self` the cause of `consequent`.
    pub fn context(self, consequent: Error) -> Error {
        Error {
            inner: Arc::new(ErrorInner {
                kind: match Arc::try_unwrap(consequent.inner) {
                    Ok(inner) => inner.kind,
                    Err(shared) => ErrorKind::Adhoc(shared.kind.to_string()),
                },
                cause: Some(self),
            }),
        }
    }

    /// The error that caused this one, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.inner.cause.as_ref()
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.kind {
            ErrorKind::Anyhow(err) | ErrorKind::Adapter(err) => Some(err.as_ref()),
            _ => self
                .inner
                .cause
                .as_ref()
                .map(|cause| cause as &(dyn std::error::Error + 'static)),
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Adhoc(msg) => f.write_str(msg),
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            RecordNotFound(msg) => write!(f, "record not found: {msg}"),
            MissingKey(key) => write!(f, "missing relationship key: {key}"),
            Expression(msg) => write!(f, "invalid query expression: {msg}"),
            Transaction(msg) => write!(f, "transaction rolled back: {msg}"),
            Adapter(err) => write!(f, "adapter error: {err}"),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(&err.inner.kind, f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
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
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}
