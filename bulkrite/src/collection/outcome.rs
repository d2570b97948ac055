use crate::common::{DUPLICATE_KEY_ERROR, TIMEOUT_ERROR};
use crate::document::Value;
use crate::errors::ErrorKind;
use std::fmt::Display;

/// The result of a single dispatched collection operation.
///
/// Exactly one underlying operation is issued per write request; the outcome
/// carries whichever counts and ids that operation produced. Outcomes are
/// merged into a [`BulkResult`](crate::executor::BulkResult) by the result
/// aggregator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationOutcome {
    inserted_id: Option<Value>,
    matched: u64,
    modified: u64,
    removed: u64,
    upserted_id: Option<Value>,
}

impl OperationOutcome {
    /// Outcome of a successful insert.
    pub fn inserted(id: Value) -> Self {
        OperationOutcome {
            inserted_id: Some(id),
            ..Default::default()
        }
    }

    /// Outcome of an update or replace that matched existing documents.
    pub fn matched(matched: u64, modified: u64) -> Self {
        OperationOutcome {
            matched,
            modified,
            ..Default::default()
        }
    }

    /// Outcome of an update or replace that matched nothing and inserted a
    /// new document instead.
    pub fn upserted(id: Value) -> Self {
        OperationOutcome {
            upserted_id: Some(id),
            ..Default::default()
        }
    }

    /// Outcome of a delete.
    pub fn removed(count: u64) -> Self {
        OperationOutcome {
            removed: count,
            ..Default::default()
        }
    }

    pub fn inserted_id(&self) -> Option<&Value> {
        self.inserted_id.as_ref()
    }

    pub fn matched_count(&self) -> u64 {
        self.matched
    }

    pub fn modified_count(&self) -> u64 {
        self.modified
    }

    pub fn removed_count(&self) -> u64 {
        self.removed
    }

    pub fn upserted_id(&self) -> Option<&Value> {
        self.upserted_id.as_ref()
    }
}

/// A failure reported by the collection collaborator for a single operation.
///
/// Failures are recorded, not thrown, during execution; the presence of at
/// least one converts the finalized result into a
/// [`BulkWriteFailure`](crate::executor::BulkWriteFailure).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteFailure {
    code: i32,
    message: String,
}

impl WriteFailure {
    /// Creates a new `WriteFailure` with the given collaborator error code
    /// and message.
    pub fn new(code: i32, message: &str) -> Self {
        WriteFailure {
            code,
            message: message.to_string(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps the collaborator error code onto the crate error taxonomy.
    pub fn error_kind(&self) -> ErrorKind {
        match self.code {
            DUPLICATE_KEY_ERROR => ErrorKind::DuplicateKey,
            TIMEOUT_ERROR => ErrorKind::TimeoutError,
            _ => ErrorKind::WriteError,
        }
    }
}

impl Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "write failure (code {}): {}", self.code, self.message)
    }
}
