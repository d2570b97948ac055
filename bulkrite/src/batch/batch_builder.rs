use crate::batch::WriteRequest;
use crate::document::Document;
use crate::errors::BulkriteResult;

/// The execution mode of a [Batch].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Requests execute strictly in submission order; the first failure
    /// halts execution and later requests are never attempted.
    #[default]
    Ordered,
    /// Every request is attempted regardless of individual failures;
    /// dispatch may run concurrently.
    Unordered,
}

/// An immutable, ordered sequence of write requests ready for execution.
///
/// Batches are produced by [BatchBuilder::build] and consumed by
/// [`BulkExecutor::execute`](crate::executor::BulkExecutor::execute).
#[derive(Clone, Debug)]
pub struct Batch {
    requests: Vec<WriteRequest>,
    mode: BatchMode,
}

impl Batch {
    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// The requests of this batch, in submission order.
    pub fn requests(&self) -> &[WriteRequest] {
        &self.requests
    }
}

/// Accumulates write requests and produces a [Batch].
///
/// Inserts are added directly with [BatchBuilder::insert]. Filtered
/// operations use the deferred `find(...)` pattern: [BatchBuilder::find]
/// returns a [RequestCursor] scoped to the builder, and the request is only
/// constructed when a terminal method (`update`, `update_one`,
/// `replace_one`, `remove`, `remove_one`) is called on the cursor. Calling
/// [RequestCursor::upsert] before a terminal method marks the eventual
/// request as an upsert.
///
/// A request whose construction fails is not added; the failure is local to
/// that call and the builder stays usable.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::batch::{BatchBuilder, BatchMode};
/// use bulkrite::doc;
///
/// let mut builder = BatchBuilder::new();
/// builder.insert(doc! { "insert": "1" })?;
/// builder.insert(doc! { "insert": "2" })?;
/// builder.find(doc! { "insert": "2" }).replace_one(doc! { "insert": "2.1" })?;
/// builder.find(doc! { "_id": "money" }).upsert().update_one(doc! { "counter": 1 })?;
///
/// let batch = builder.build(BatchMode::Ordered);
/// ```
#[derive(Default)]
pub struct BatchBuilder {
    requests: Vec<WriteRequest>,
}

impl BatchBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        BatchBuilder {
            requests: Vec::new(),
        }
    }

    /// Appends an insert request for the given document.
    pub fn insert(&mut self, document: Document) -> BulkriteResult<&mut Self> {
        let request = WriteRequest::insert(document)?;
        self.requests.push(request);
        Ok(self)
    }

    /// Appends an already-constructed request.
    pub fn add(&mut self, request: WriteRequest) -> &mut Self {
        self.requests.push(request);
        self
    }

    /// Starts a filtered operation. The returned cursor defers request
    /// construction until one of its terminal methods is called.
    pub fn find(&mut self, filter: Document) -> RequestCursor<'_> {
        RequestCursor {
            builder: self,
            filter,
            upsert: false,
        }
    }

    /// The number of requests accumulated so far.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Finalizes the builder into an immutable [Batch] with the given mode.
    pub fn build(self, mode: BatchMode) -> Batch {
        log::debug!(
            "built {:?} batch with {} request(s)",
            mode,
            self.requests.len()
        );
        Batch {
            requests: self.requests,
            mode,
        }
    }
}

/// A builder-scoped handle for one filtered operation.
///
/// Created by [BatchBuilder::find]; consumed by its terminal methods, each of
/// which validates and appends exactly one request to the owning builder.
pub struct RequestCursor<'a> {
    builder: &'a mut BatchBuilder,
    filter: Document,
    upsert: bool,
}

impl RequestCursor<'_> {
    /// Marks the eventual request as an upsert: if no document matches the
    /// filter, one derived from the filter and payload is inserted instead.
    pub fn upsert(mut self) -> Self {
        self.upsert = true;
        self
    }

    /// Terminal: update every document matching the filter.
    pub fn update(self, update: Document) -> BulkriteResult<()> {
        let request = WriteRequest::update_many(self.filter, update, self.upsert)?;
        self.builder.requests.push(request);
        Ok(())
    }

    /// Terminal: update the first document matching the filter.
    pub fn update_one(self, update: Document) -> BulkriteResult<()> {
        let request = WriteRequest::update_one(self.filter, update, self.upsert)?;
        self.builder.requests.push(request);
        Ok(())
    }

    /// Terminal: replace the first document matching the filter.
    pub fn replace_one(self, replacement: Document) -> BulkriteResult<()> {
        let request = WriteRequest::replace_one(self.filter, replacement, self.upsert)?;
        self.builder.requests.push(request);
        Ok(())
    }

    /// Terminal: remove every document matching the filter.
    pub fn remove(self) -> BulkriteResult<()> {
        let request = if self.upsert {
            // surfaces as InvalidRequest; remove never upserts
            WriteRequest::new(
                crate::batch::RequestKind::RemoveMany,
                Some(self.filter),
                None,
                true,
            )?
        } else {
            WriteRequest::remove_many(self.filter)?
        };
        self.builder.requests.push(request);
        Ok(())
    }

    /// Terminal: remove the first document matching the filter.
    pub fn remove_one(self) -> BulkriteResult<()> {
        let request = if self.upsert {
            WriteRequest::new(
                crate::batch::RequestKind::RemoveOne,
                Some(self.filter),
                None,
                true,
            )?
        } else {
            WriteRequest::remove_one(self.filter)?
        };
        self.builder.requests.push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RequestKind;
    use crate::doc;
    use crate::errors::ErrorKind;

    #[test]
    fn test_empty_builder_builds_empty_batch() {
        let batch = BatchBuilder::new().build(BatchMode::Ordered);
        assert!(batch.is_empty());
        assert_eq!(batch.mode(), BatchMode::Ordered);
    }

    #[test]
    fn test_insert_appends_requests_in_order() {
        let mut builder = BatchBuilder::new();
        builder.insert(doc! { insert: "1" }).unwrap();
        builder.insert(doc! { insert: "2" }).unwrap();

        let batch = builder.build(BatchMode::Ordered);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.requests()[0].kind(), RequestKind::Insert);
        assert_eq!(
            batch.requests()[0].payload(),
            Some(&doc! { insert: "1" })
        );
        assert_eq!(
            batch.requests()[1].payload(),
            Some(&doc! { insert: "2" })
        );
    }

    #[test]
    fn test_find_defers_request_until_terminal_call() {
        let mut builder = BatchBuilder::new();
        {
            let _cursor = builder.find(doc! { n: 1 });
            // dropped without a terminal call: nothing added
        }
        assert!(builder.is_empty());

        builder.find(doc! { n: 1 }).update(doc! { n: 2 }).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_find_terminals_map_to_request_kinds() {
        let mut builder = BatchBuilder::new();
        builder.find(doc! {}).update(doc! { n: 1 }).unwrap();
        builder.find(doc! {}).update_one(doc! { n: 1 }).unwrap();
        builder.find(doc! {}).replace_one(doc! { n: 1 }).unwrap();
        builder.find(doc! {}).remove().unwrap();
        builder.find(doc! {}).remove_one().unwrap();

        let batch = builder.build(BatchMode::Unordered);
        let kinds: Vec<RequestKind> = batch.requests().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RequestKind::UpdateMany,
                RequestKind::UpdateOne,
                RequestKind::ReplaceOne,
                RequestKind::RemoveMany,
                RequestKind::RemoveOne,
            ]
        );
    }

    #[test]
    fn test_upsert_marks_the_eventual_request() {
        let mut builder = BatchBuilder::new();
        builder
            .find(doc! { "_id": "money" })
            .upsert()
            .update_one(doc! { counter: 1 })
            .unwrap();
        builder.find(doc! { n: 1 }).update_one(doc! { n: 2 }).unwrap();

        let batch = builder.build(BatchMode::Ordered);
        assert!(batch.requests()[0].is_upsert());
        assert!(!batch.requests()[1].is_upsert());
    }

    #[test]
    fn test_upsert_remove_is_rejected_but_builder_survives() {
        let mut builder = BatchBuilder::new();
        let result = builder.find(doc! { n: 1 }).upsert().remove();
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
        assert!(builder.is_empty());

        // the failed call does not poison the builder
        builder.insert(doc! { n: 1 }).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_empty_update_payload_stays_empty() {
        let mut builder = BatchBuilder::new();
        builder
            .find(doc! { "_id": "money" })
            .upsert()
            .update_one(doc! {})
            .unwrap();

        let batch = builder.build(BatchMode::Ordered);
        let request = &batch.requests()[0];
        // the payload must remain the empty document, not the filter
        assert_eq!(request.payload(), Some(&doc! {}));
        assert_eq!(request.filter(), Some(&doc! { "_id": "money" }));
    }

    #[test]
    fn test_build_preserves_mode() {
        let batch = BatchBuilder::new().build(BatchMode::Unordered);
        assert_eq!(batch.mode(), BatchMode::Unordered);
    }
}
