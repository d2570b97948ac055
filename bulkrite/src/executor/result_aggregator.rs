use crate::collection::{OperationOutcome, WriteFailure};
use crate::document::Value;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// A single failed write inside a batch.
///
/// The index refers to the request's position in the original batch, not its
/// position among the attempted requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteError {
    request_index: usize,
    code: i32,
    message: String,
}

impl WriteError {
    /// Creates a `WriteError` from a collaborator failure and the originating
    /// request index.
    pub fn new(request_index: usize, failure: WriteFailure) -> Self {
        WriteError {
            request_index,
            code: failure.code(),
            message: failure.message().to_string(),
        }
    }

    pub fn request_index(&self) -> usize {
        self.request_index
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "request {} failed (code {}): {}",
            self.request_index, self.code, self.message
        )
    }
}

/// The id a single upsert assigned, together with the originating request
/// index.
#[derive(Clone, Debug, PartialEq)]
pub struct Upsert {
    request_index: usize,
    id: Value,
}

impl Upsert {
    pub fn new(request_index: usize, id: Value) -> Self {
        Upsert { request_index, id }
    }

    pub fn request_index(&self) -> usize {
        self.request_index
    }

    pub fn id(&self) -> &Value {
        &self.id
    }
}

/// The merged outcome of a bulk execution.
///
/// Carries the running counts of every successful operation, the ids
/// assigned by upserts, and the write errors sorted ascending by originating
/// request index. A `BulkResult` is returned directly when no request
/// failed; otherwise it travels inside a [BulkWriteFailure] so callers can
/// still recover the partial success counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BulkResult {
    inserted_count: u64,
    matched_count: u64,
    modified_count: u64,
    removed_count: u64,
    upserted_count: u64,
    upserts: Vec<Upsert>,
    errors: Vec<WriteError>,
}

impl BulkResult {
    pub fn inserted_count(&self) -> u64 {
        self.inserted_count
    }

    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }

    pub fn removed_count(&self) -> u64 {
        self.removed_count
    }

    pub fn upserted_count(&self) -> u64 {
        self.upserted_count
    }

    /// The ids assigned by upserts, in ascending request-index order.
    pub fn upserts(&self) -> &[Upsert] {
        &self.upserts
    }

    /// The write errors, in ascending request-index order.
    pub fn errors(&self) -> &[WriteError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Display for BulkResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted: {}, matched: {}, modified: {}, removed: {}, upserted: {}, errors: {}",
            self.inserted_count,
            self.matched_count,
            self.modified_count,
            self.removed_count,
            self.upserted_count,
            self.errors.len()
        )
    }
}

/// Raised by the executor when at least one request in the batch failed.
///
/// The failure carries the full [BulkResult], not just the errors, so
/// callers can distinguish "nothing happened" from "some operations
/// succeeded around the failure".
#[derive(Clone)]
pub struct BulkWriteFailure {
    result: BulkResult,
}

impl BulkWriteFailure {
    pub fn new(result: BulkResult) -> Self {
        BulkWriteFailure { result }
    }

    /// The full result of the partially-failed execution.
    pub fn result(&self) -> &BulkResult {
        &self.result
    }

    /// Consumes the failure, yielding the full result.
    pub fn into_result(self) -> BulkResult {
        self.result
    }

    /// The write errors, in ascending request-index order.
    pub fn write_errors(&self) -> &[WriteError] {
        self.result.errors()
    }
}

impl Display for BulkWriteFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bulk write failed with {} write error(s); {}",
            self.result.errors().len(),
            self.result
        )
    }
}

impl Debug for BulkWriteFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BulkWriteFailure({})", self)
    }
}

impl Error for BulkWriteFailure {}

/// Accumulates per-request outcomes into a [BulkResult].
///
/// Pure accumulation: [`record`](ResultAggregator::record) and
/// [`record_error`](ResultAggregator::record_error) maintain the running
/// counts and error list; [`finalize`](ResultAggregator::finalize) sorts by
/// request index and yields the result, with no other side effects.
#[derive(Default)]
pub struct ResultAggregator {
    result: BulkResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator {
            result: BulkResult::default(),
        }
    }

    /// Records the successful outcome of the request at `request_index`.
    pub fn record(&mut self, request_index: usize, outcome: &OperationOutcome) {
        if outcome.inserted_id().is_some() {
            self.result.inserted_count += 1;
        }
        self.result.matched_count += outcome.matched_count();
        self.result.modified_count += outcome.modified_count();
        self.result.removed_count += outcome.removed_count();
        if let Some(id) = outcome.upserted_id() {
            self.result.upserted_count += 1;
            self.result
                .upserts
                .push(Upsert::new(request_index, id.clone()));
        }
    }

    /// Records the failure of the request at `request_index`.
    pub fn record_error(&mut self, request_index: usize, failure: WriteFailure) {
        log::debug!("request {} failed: {}", request_index, failure);
        self.result.errors.push(WriteError::new(request_index, failure));
    }

    /// Finalizes accumulation into a [BulkResult] with errors and upserts
    /// sorted ascending by request index, regardless of completion order.
    pub fn finalize(mut self) -> BulkResult {
        self.result.errors.sort_by_key(|error| error.request_index);
        self.result.upserts.sort_by_key(|upsert| upsert.request_index);
        self.result
    }
}
