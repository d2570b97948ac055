use crate::batch::{Batch, BatchMode, RequestKind, WriteRequest};
use crate::collection::{Collection, OperationOutcome, WriteConcern, WriteFailure};
use crate::document::Document;
use crate::executor::{BulkResult, BulkWriteFailure, ResultAggregator};
use crate::get_cpu_count;
use crate::common::DOC_ID;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Executes batches against a collection collaborator.
///
/// The executor owns no mutable state across executions: each call to
/// [BulkExecutor::execute] is self-contained. Two execution modes exist,
/// chosen by the batch:
///
/// - **Ordered**: requests run strictly in submission order; the first
///   failure halts execution immediately and later requests are never
///   dispatched. The result covers requests `0..=failing index`.
/// - **Unordered**: every request is attempted exactly once; dispatch runs
///   concurrently on a pool of scoped worker threads when the host and the
///   batch size allow. Failures are recorded and execution continues.
///   Batches whose inserts share an explicit `_id` run sequentially so the
///   duplicate-key error always lands on the later request.
///
/// In both modes, every failure is captured into the result rather than
/// unwound mid-batch; a non-empty error list converts into a single
/// [BulkWriteFailure] at the end, which still carries the full [BulkResult]
/// so partial success counts stay recoverable.
///
/// The per-operation write concern resolves in cascade order: the
/// executor's explicit setting, then the collection's configured default,
/// then acknowledged.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::batch::{BatchBuilder, BatchMode};
/// use bulkrite::collection::{Collection, MemoryCollection, WriteConcern};
/// use bulkrite::executor::BulkExecutor;
/// use bulkrite::doc;
///
/// let collection = Collection::new(MemoryCollection::new("bulkops"));
/// let executor = BulkExecutor::new(collection).with_write_concern(WriteConcern::acknowledged());
///
/// let mut builder = BatchBuilder::new();
/// builder.insert(doc! { "insert": "1" })?;
/// builder.insert(doc! { "insert": "2" })?;
///
/// let result = executor.execute(builder.build(BatchMode::Ordered))?;
/// assert_eq!(result.inserted_count(), 2);
/// ```
pub struct BulkExecutor {
    collection: Collection,
    write_concern: Option<WriteConcern>,
    timeout: Option<Duration>,
}

impl BulkExecutor {
    /// Creates a new executor bound to the given collection.
    pub fn new(collection: Collection) -> Self {
        BulkExecutor {
            collection,
            write_concern: None,
            timeout: None,
        }
    }

    /// Sets an explicit write concern, overriding the collection's default.
    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = Some(write_concern);
        self
    }

    /// Sets a per-operation timeout, passed through to every dispatched
    /// collaborator call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolves the effective write concern: executor setting, then
    /// collection default, then acknowledged.
    fn effective_write_concern(&self) -> WriteConcern {
        self.write_concern
            .clone()
            .or_else(|| self.collection.write_concern())
            .unwrap_or_else(WriteConcern::acknowledged)
    }

    /// Executes the batch, consuming it.
    ///
    /// Returns the merged [BulkResult] when every attempted request
    /// succeeded, or a [BulkWriteFailure] carrying the full result when at
    /// least one failed.
    pub fn execute(&self, batch: Batch) -> Result<BulkResult, BulkWriteFailure> {
        let write_concern = self.effective_write_concern();
        log::debug!(
            "executing {:?} batch of {} request(s) against '{}' with write concern {}",
            batch.mode(),
            batch.len(),
            self.collection.name(),
            write_concern
        );

        let result = match batch.mode() {
            BatchMode::Ordered => self.execute_ordered(&batch, &write_concern),
            BatchMode::Unordered => self.execute_unordered(&batch, &write_concern),
        };

        if result.has_errors() {
            Err(BulkWriteFailure::new(result))
        } else {
            Ok(result)
        }
    }

    /// Strictly sequential execution; halts at the first failure.
    fn execute_ordered(&self, batch: &Batch, write_concern: &WriteConcern) -> BulkResult {
        let mut aggregator = ResultAggregator::new();
        for (index, request) in batch.requests().iter().enumerate() {
            match self.dispatch(request, write_concern) {
                Ok(outcome) => aggregator.record(index, &outcome),
                Err(failure) => {
                    log::debug!(
                        "ordered batch halted at request {} of {}",
                        index,
                        batch.len()
                    );
                    aggregator.record_error(index, failure);
                    break;
                }
            }
        }
        aggregator.finalize()
    }

    /// Checks whether two insert requests carry the same explicit `_id`.
    /// Such requests race for the duplicate-key error under concurrent
    /// dispatch, so they must run in submission order to keep the error
    /// attributed to the later request.
    fn has_conflicting_inserts(requests: &[WriteRequest]) -> bool {
        let mut seen = HashSet::new();
        for request in requests {
            if request.kind() != RequestKind::Insert {
                continue;
            }
            if let Some(id) = request.payload().and_then(|payload| payload.get(DOC_ID)) {
                if !seen.insert(id) {
                    return true;
                }
            }
        }
        false
    }

    /// Attempts every request exactly once, concurrently when worthwhile.
    fn execute_unordered(&self, batch: &Batch, write_concern: &WriteConcern) -> BulkResult {
        let requests = batch.requests();
        let workers = get_cpu_count().min(requests.len());

        if workers <= 1 || Self::has_conflicting_inserts(requests) {
            let mut aggregator = ResultAggregator::new();
            for (index, request) in requests.iter().enumerate() {
                match self.dispatch(request, write_concern) {
                    Ok(outcome) => aggregator.record(index, &outcome),
                    Err(failure) => aggregator.record_error(index, failure),
                }
            }
            return aggregator.finalize();
        }

        // work-stealing over a shared index; each request is claimed by
        // exactly one worker
        let aggregator = Mutex::new(ResultAggregator::new());
        let next_index = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next_index.fetch_add(1, Ordering::SeqCst);
                    if index >= requests.len() {
                        break;
                    }
                    let dispatched = self.dispatch(&requests[index], write_concern);
                    let mut aggregator = aggregator.lock();
                    match dispatched {
                        Ok(outcome) => aggregator.record(index, &outcome),
                        Err(failure) => aggregator.record_error(index, failure),
                    }
                });
            }
        });

        aggregator.into_inner().finalize()
    }

    /// Translates one request into exactly one collaborator call.
    fn dispatch(
        &self,
        request: &WriteRequest,
        write_concern: &WriteConcern,
    ) -> Result<OperationOutcome, WriteFailure> {
        let empty = Document::new();
        let filter = request.filter().unwrap_or(&empty);
        let payload = request.payload().unwrap_or(&empty);

        log::trace!(
            "dispatching {} against '{}'",
            request.kind(),
            self.collection.name()
        );

        match request.kind() {
            RequestKind::Insert => {
                self.collection
                    .insert_one(payload.clone(), write_concern, self.timeout)
            }
            RequestKind::UpdateOne => self.collection.update_by_filter(
                filter,
                payload,
                false,
                request.is_upsert(),
                write_concern,
                self.timeout,
            ),
            RequestKind::UpdateMany => self.collection.update_by_filter(
                filter,
                payload,
                true,
                request.is_upsert(),
                write_concern,
                self.timeout,
            ),
            RequestKind::ReplaceOne => self.collection.replace_by_filter(
                filter,
                payload,
                request.is_upsert(),
                write_concern,
                self.timeout,
            ),
            RequestKind::RemoveOne => {
                self.collection
                    .delete_by_filter(filter, false, write_concern, self.timeout)
            }
            RequestKind::RemoveMany => {
                self.collection
                    .delete_by_filter(filter, true, write_concern, self.timeout)
            }
        }
    }
}
