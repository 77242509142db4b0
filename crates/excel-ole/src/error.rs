//! Error types for excel-ole.

use excel_ole_core::DecodeError;
use thiserror::Error;

/// A failure reported by the automation layer itself: an unknown member, a rejected
/// argument, an exception raised by the application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    /// HRESULT or SCODE, when the layer provides one.
    pub code: Option<i32>,
    pub message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Errors returned by every public operation of this crate.
///
/// Each variant carries the name of the operation that failed.
#[derive(Debug, Error)]
pub enum Error {
    /// The application could not be created or queried. Fatal to the session.
    #[error("{operation}: failed to initialize automation: {source}")]
    Initialize {
        operation: &'static str,
        #[source]
        source: Fault,
    },

    /// A property along a path does not exist or rejected the access.
    #[error("{operation}: property walk '{path}' failed at '{segment}': {source}")]
    Walk {
        operation: &'static str,
        path: String,
        segment: String,
        #[source]
        source: Fault,
    },

    /// A value came back with a payload that does not fit its tag.
    #[error("{operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: DecodeError,
    },

    /// The caller supplied an unusable argument.
    #[error("{operation}: {reason}")]
    BadArgument {
        operation: &'static str,
        reason: String,
    },

    /// A method call or property access outside a path walk failed.
    #[error("{operation} failed: {source}")]
    Automation {
        operation: &'static str,
        #[source]
        source: Fault,
    },

    #[error("{operation}: {source}")]
    Address {
        operation: &'static str,
        #[source]
        source: excel_ole_core::Error,
    },
}

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The operation that produced this error.
    pub fn operation(&self) -> &'static str {
        match self {
            Error::Initialize { operation, .. }
            | Error::Walk { operation, .. }
            | Error::Decode { operation, .. }
            | Error::BadArgument { operation, .. }
            | Error::Automation { operation, .. }
            | Error::Address { operation, .. } => operation,
        }
    }

    pub(crate) fn automation(operation: &'static str) -> impl FnOnce(Fault) -> Error {
        move |source| Error::Automation { operation, source }
    }

    pub(crate) fn decode(operation: &'static str) -> impl FnOnce(DecodeError) -> Error {
        move |source| Error::Decode { operation, source }
    }

    pub(crate) fn address(operation: &'static str) -> impl FnOnce(excel_ole_core::Error) -> Error {
        move |source| Error::Address { operation, source }
    }

    pub(crate) fn bad_argument(operation: &'static str, reason: impl Into<String>) -> Error {
        Error::BadArgument {
            operation,
            reason: reason.into(),
        }
    }
}

/// Panicking convenience form of any fallible operation.
///
/// ```rust,no_run
/// # use excel_ole::{OrPanic, Result};
/// # fn read() -> Result<String> { Ok(String::new()) }
/// let text = read().or_panic();
/// ```
pub trait OrPanic<T> {
    /// Unwrap the value, panicking with the error's message unchanged.
    fn or_panic(self) -> T;
}

impl<T> OrPanic<T> for Result<T> {
    #[track_caller]
    fn or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::Walk {
            operation: "get_one",
            path: "Font.Size".into(),
            segment: "Font".into(),
            source: Fault::new("unknown name"),
        };
        assert_eq!(
            err.to_string(),
            "get_one: property walk 'Font.Size' failed at 'Font': unknown name"
        );
        assert_eq!(err.operation(), "get_one");
    }

    #[test]
    #[should_panic(expected = "put_many: no value supplied")]
    fn test_or_panic_keeps_message() {
        let result: Result<()> = Err(Error::bad_argument("put_many", "no value supplied"));
        result.or_panic();
    }

    #[test]
    fn test_or_panic_passes_values_through() {
        let result: Result<i32> = Ok(7);
        assert_eq!(result.or_panic(), 7);
    }
}
