use crate::collection::{OperationOutcome, WriteConcern, WriteFailure};
use crate::document::Document;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Trait defining the interface of the collection collaborator.
///
/// The bulk executor dispatches every write request as exactly one call on
/// this trait. Implementations own document encoding, storage, and transport;
/// this crate never looks inside them. Each call receives the effective
/// per-operation [WriteConcern] and an optional timeout; exceeding the
/// timeout must be reported as a [WriteFailure] with the timeout code, never
/// by blocking indefinitely.
///
/// Implementations must be `Send + Sync`: unordered batches may dispatch
/// operations from multiple threads concurrently.
pub trait CollectionProvider: Send + Sync {
    /// Inserts a single document.
    ///
    /// The implementation assigns a fresh object id when the document has no
    /// `_id` field, and rejects duplicate `_id` values.
    fn insert_one(
        &self,
        document: Document,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure>;

    /// Updates documents matching `filter` by merging the fields of `update`,
    /// a single document or all matches depending on `multi`. With `upsert`,
    /// a miss inserts a document derived from the filter and update instead.
    fn update_by_filter(
        &self,
        filter: &Document,
        update: &Document,
        multi: bool,
        upsert: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure>;

    /// Replaces the first document matching `filter` with `replacement`,
    /// preserving its `_id`. With `upsert`, a miss inserts instead.
    fn replace_by_filter(
        &self,
        filter: &Document,
        replacement: &Document,
        upsert: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure>;

    /// Deletes the first document matching `filter`, or all matches when
    /// `multi` is set.
    fn delete_by_filter(
        &self,
        filter: &Document,
        multi: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure>;

    /// The write concern configured on this collection, if any. Used when
    /// the executor has no explicit write concern of its own.
    fn write_concern(&self) -> Option<WriteConcern> {
        None
    }

    /// Returns the name of this collection.
    fn name(&self) -> String;
}

// lets callers hold a handle to the concrete provider while the executor
// works through `Collection`
impl<P: CollectionProvider + ?Sized> CollectionProvider for Arc<P> {
    fn insert_one(
        &self,
        document: Document,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        (**self).insert_one(document, write_concern, timeout)
    }

    fn update_by_filter(
        &self,
        filter: &Document,
        update: &Document,
        multi: bool,
        upsert: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        (**self).update_by_filter(filter, update, multi, upsert, write_concern, timeout)
    }

    fn replace_by_filter(
        &self,
        filter: &Document,
        replacement: &Document,
        upsert: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        (**self).replace_by_filter(filter, replacement, upsert, write_concern, timeout)
    }

    fn delete_by_filter(
        &self,
        filter: &Document,
        multi: bool,
        write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        (**self).delete_by_filter(filter, multi, write_concern, timeout)
    }

    fn write_concern(&self) -> Option<WriteConcern> {
        (**self).write_concern()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// A handle to a collection collaborator.
///
/// `Collection` wraps a [CollectionProvider] implementation behind an `Arc`,
/// so handles are cheap to clone and all clones share the same underlying
/// collection.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::collection::{Collection, MemoryCollection};
///
/// let collection = Collection::new(MemoryCollection::new("users"));
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<dyn CollectionProvider>,
}

impl Collection {
    /// Creates a new `Collection` from a provider implementation.
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        Collection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Collection {
    type Target = Arc<dyn CollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
