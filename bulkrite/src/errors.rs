use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for bulkrite operations.
///
/// Each kind describes a category of failure raised locally by this crate.
/// Failures reported by the collection collaborator travel as
/// [`WriteFailure`](crate::collection::WriteFailure) values instead and are
/// aggregated into the bulk result rather than raised.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::errors::{BulkriteError, ErrorKind, BulkriteResult};
///
/// fn example() -> BulkriteResult<()> {
///     Err(BulkriteError::new("Insert does not take a filter", ErrorKind::InvalidRequest))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Request Errors - raised during write request construction
    /// A write request violated its construction invariants
    InvalidRequest,
    /// The operation is not valid in the current context
    InvalidOperation,

    // ID Errors - raised during object id parsing
    /// The provided object id is invalid
    InvalidId,

    // Execution Errors - mirrored from collaborator failure codes
    /// A single write operation was rejected by the collection
    WriteError,
    /// A unique `_id` constraint was violated
    DuplicateKey,
    /// An operation exceeded its caller-supplied timeout
    TimeoutError,

    // Data Errors
    /// Error encoding or decoding a document
    EncodingError,

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidRequest => write!(f, "Invalid request"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::WriteError => write!(f, "Write error"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::TimeoutError => write!(f, "Timeout"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom bulkrite error type.
///
/// `BulkriteError` encapsulates error information including the error
/// message, kind, and optional cause. It supports error chaining and
/// backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::errors::{BulkriteError, ErrorKind};
///
/// // Create a simple error
/// let err = BulkriteError::new("Remove does not take a payload", ErrorKind::InvalidRequest);
///
/// // Create an error with a cause
/// let cause = BulkriteError::new("Invalid hex digit", ErrorKind::EncodingError);
/// let err = BulkriteError::new_with_cause("Malformed object id", ErrorKind::InvalidId, cause);
/// ```
///
/// # Type alias
///
/// The `BulkriteResult<T>` type alias is equivalent to `Result<T, BulkriteError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct BulkriteError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<BulkriteError>>,
    backtrace: Atomic<Backtrace>,
}

impl BulkriteError {
    /// Creates a new `BulkriteError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        BulkriteError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `BulkriteError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: BulkriteError) -> Self {
        BulkriteError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&Box<BulkriteError>> {
        self.cause.as_ref()
    }
}

impl Display for BulkriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for BulkriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for BulkriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for bulkrite operations.
///
/// `BulkriteResult<T>` is shorthand for `Result<T, BulkriteError>`.
/// All fallible bulkrite operations return this type.
pub type BulkriteResult<T> = Result<T, BulkriteError>;

// From trait implementations for automatic error conversion
impl From<std::num::ParseIntError> for BulkriteError {
    fn from(err: std::num::ParseIntError) -> Self {
        BulkriteError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for BulkriteError {
    fn from(msg: String) -> Self {
        BulkriteError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for BulkriteError {
    fn from(msg: &str) -> Self {
        BulkriteError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulkrite_error_new_creates_error() {
        let error = BulkriteError::new("An error occurred", ErrorKind::InvalidRequest);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::InvalidRequest);
        assert!(error.cause().is_none());
    }

    #[test]
    fn bulkrite_error_new_with_cause_creates_error() {
        let cause = BulkriteError::new("Invalid hex digit", ErrorKind::EncodingError);
        let error = BulkriteError::new_with_cause("Malformed object id", ErrorKind::InvalidId, cause);
        assert_eq!(error.message(), "Malformed object id");
        assert_eq!(error.kind(), &ErrorKind::InvalidId);
        assert!(error.cause().is_some());
    }

    #[test]
    fn bulkrite_error_display_formats_correctly() {
        let error = BulkriteError::new("An error occurred", ErrorKind::InvalidOperation);
        assert_eq!(format!("{}", error), "An error occurred");
    }

    #[test]
    fn bulkrite_error_debug_formats_with_cause() {
        let cause = BulkriteError::new("root", ErrorKind::EncodingError);
        let error = BulkriteError::new_with_cause("top", ErrorKind::InvalidId, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("top"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn bulkrite_error_source_returns_cause() {
        let cause = BulkriteError::new("root", ErrorKind::EncodingError);
        let error = BulkriteError::new_with_cause("top", ErrorKind::InvalidId, cause);
        assert!(error.source().is_some());

        let error = BulkriteError::new("no cause", ErrorKind::InternalError);
        assert!(error.source().is_none());
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::InvalidRequest), "Invalid request");
        assert_eq!(format!("{}", ErrorKind::DuplicateKey), "Duplicate key");
        assert_eq!(format!("{}", ErrorKind::TimeoutError), "Timeout");
    }

    #[test]
    fn test_error_kind_equality() {
        let error1 = BulkriteError::new("Error 1", ErrorKind::WriteError);
        let error2 = BulkriteError::new("Error 2", ErrorKind::WriteError);
        let error3 = BulkriteError::new("Error 3", ErrorKind::TimeoutError);

        assert_eq!(error1.kind(), error2.kind());
        assert_ne!(error1.kind(), error3.kind());
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "zz".parse::<i32>().unwrap_err();
        let error: BulkriteError = parse_err.into();
        assert_eq!(error.kind(), &ErrorKind::EncodingError);
        assert!(error.message().contains("Integer parsing"));
    }

    #[test]
    fn test_from_string_and_str() {
        let error: BulkriteError = String::from("owned message").into();
        assert_eq!(error.kind(), &ErrorKind::InternalError);
        assert_eq!(error.message(), "owned message");

        let error: BulkriteError = "borrowed message".into();
        assert_eq!(error.kind(), &ErrorKind::InternalError);
        assert_eq!(error.message(), "borrowed message");
    }

    #[test]
    fn test_question_mark_operator_with_from() {
        fn parse_hex_byte(s: &str) -> BulkriteResult<u8> {
            let byte = u8::from_str_radix(s, 16)?;
            Ok(byte)
        }

        assert_eq!(parse_hex_byte("ff").unwrap(), 255);
        let err = parse_hex_byte("zz").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn test_error_chain_with_different_kinds() {
        let root_cause = BulkriteError::new("Bad byte", ErrorKind::EncodingError);
        let top_level =
            BulkriteError::new_with_cause("Cannot parse object id", ErrorKind::InvalidId, root_cause);

        assert_eq!(top_level.kind(), &ErrorKind::InvalidId);
        if let Some(cause) = top_level.cause() {
            assert_eq!(cause.kind(), &ErrorKind::EncodingError);
        }
    }
}
