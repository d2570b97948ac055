use crate::collection::{CollectionProvider, OperationOutcome, WriteConcern, WriteFailure};
use crate::common::{DOC_ID, DUPLICATE_KEY_ERROR, TIMEOUT_ERROR, VALIDATION_ERROR};
use crate::document::{Document, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::time::Duration;

/// An in-memory [CollectionProvider].
///
/// `MemoryCollection` stores documents in an insertion-ordered map keyed by
/// their `_id` value, guarded by a read-write lock so it can serve concurrent
/// dispatch from unordered batches. It implements the collaborator semantics
/// the bulk executor relies on:
///
/// - `_id` uniqueness: inserting a duplicate `_id` fails with the duplicate
///   key code.
/// - top-level equality filter matching: an empty filter matches every
///   document; a filter key set to `Null` matches only an explicit `Null`
///   value, never an absent key.
/// - updates merge the update document's fields into each matched document,
///   and may not change a target's `_id`; an empty update document is a
///   no-op on matches and upserts a document carrying only `_id` on a miss,
///   never the filter body. An update upsert with a non-empty payload
///   inserts the filter's equality fields plus the payload fields.
/// - replacements swap the whole document body but preserve `_id`; a
///   replacement upsert inserts only the replacement body plus `_id`.
///
/// A configurable per-operation latency makes timeout behavior observable in
/// tests; a configured default [WriteConcern] participates in the executor's
/// write-concern cascade.
pub struct MemoryCollection {
    name: String,
    documents: RwLock<IndexMap<Value, Document>>,
    write_concern: Option<WriteConcern>,
    latency: Option<Duration>,
}

impl MemoryCollection {
    /// Creates a new empty in-memory collection.
    pub fn new(name: &str) -> Self {
        MemoryCollection {
            name: name.to_string(),
            documents: RwLock::new(IndexMap::new()),
            write_concern: None,
            latency: None,
        }
    }

    /// Sets the default write concern of this collection. It applies when
    /// neither the executor nor the caller supplies one.
    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = Some(write_concern);
        self
    }

    /// Adds an artificial latency to every operation, so per-operation
    /// timeouts can be exercised.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Checks if the collection holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Returns all stored documents, in insertion order.
    pub fn find_all(&self) -> Vec<Document> {
        self.documents.read().values().cloned().collect()
    }

    /// Returns the document with the given `_id`, if present.
    pub fn get_by_id(&self, id: &Value) -> Option<Document> {
        self.documents.read().get(id).cloned()
    }

    /// Simulates the configured operation latency, honoring the
    /// caller-supplied timeout.
    fn apply_latency(&self, timeout: Option<Duration>) -> Result<(), WriteFailure> {
        if let Some(latency) = self.latency {
            if let Some(timeout) = timeout {
                if latency > timeout {
                    std::thread::sleep(timeout);
                    log::debug!("operation on '{}' exceeded its {:?} timeout", self.name, timeout);
                    return Err(WriteFailure::new(
                        TIMEOUT_ERROR,
                        &format!("operation exceeded timeout of {:?}", timeout),
                    ));
                }
            }
            std::thread::sleep(latency);
        }
        Ok(())
    }

    /// Checks whether `document` satisfies `filter`: every filter key must be
    /// present with an equal value. An empty filter matches everything.
    fn matches(document: &Document, filter: &Document) -> bool {
        filter
            .iter()
            .all(|(key, value)| document.get(key) == Some(value))
    }

    /// Returns the `_id` values of all documents matching `filter`, in
    /// insertion order.
    fn matching_ids(documents: &IndexMap<Value, Document>, filter: &Document) -> Vec<Value> {
        documents
            .iter()
            .filter(|(_, document)| Self::matches(document, filter))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Builds the document inserted by an upsert miss. A non-empty payload
    /// contributes its fields, preceded by the filter's equality fields when
    /// `merge_filter` is set (update upserts; the payload wins on shared
    /// keys). An empty payload yields a document carrying only `_id`. The
    /// `_id` comes from the payload, then the filter, then a fresh object id.
    fn derive_upsert(
        filter: &Document,
        payload: &Document,
        merge_filter: bool,
    ) -> Result<Document, WriteFailure> {
        let mut derived = Document::new();
        if !payload.is_empty() {
            if merge_filter {
                derived.merge(filter);
            }
            derived.merge(payload);
        }
        if !derived.has_id() {
            if let Some(id) = filter.get(DOC_ID) {
                derived
                    .put(DOC_ID, id.clone())
                    .map_err(|err| WriteFailure::new(VALIDATION_ERROR, err.message()))?;
            }
        }
        derived.id();
        Ok(derived)
    }

    /// Inserts `document` under its `_id`, enforcing `_id` uniqueness.
    fn insert_document(
        &self,
        documents: &mut IndexMap<Value, Document>,
        mut document: Document,
    ) -> Result<Value, WriteFailure> {
        let id = document.id();
        if documents.contains_key(&id) {
            log::error!("duplicate key error collection: {} dup key: {}", self.name, id);
            return Err(WriteFailure::new(
                DUPLICATE_KEY_ERROR,
                &format!(
                    "E11000 duplicate key error collection: {} dup key: {{ _id: {} }}",
                    self.name, id
                ),
            ));
        }
        documents.insert(id.clone(), document);
        Ok(id)
    }
}

impl CollectionProvider for MemoryCollection {
    fn insert_one(
        &self,
        document: Document,
        _write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        // in-memory writes complete synchronously, so every acknowledgement
        // level is trivially satisfied
        self.apply_latency(timeout)?;

        let mut documents = self.documents.write();
        let id = self.insert_document(&mut documents, document)?;
        log::debug!("inserted document {} into '{}'", id, self.name);
        Ok(OperationOutcome::inserted(id))
    }

    fn update_by_filter(
        &self,
        filter: &Document,
        update: &Document,
        multi: bool,
        upsert: bool,
        _write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        self.apply_latency(timeout)?;

        let mut documents = self.documents.write();
        let matching = Self::matching_ids(&documents, filter);

        if matching.is_empty() {
            if !upsert {
                return Ok(OperationOutcome::matched(0, 0));
            }
            let derived = Self::derive_upsert(filter, update, true)?;
            let id = self.insert_document(&mut documents, derived)?;
            log::debug!("upserted document {} into '{}'", id, self.name);
            return Ok(OperationOutcome::upserted(id));
        }

        let targets: &[Value] = if multi { &matching } else { &matching[..1] };

        // _id is immutable: an update may restate a target's id, never
        // change it
        if let Some(update_id) = update.get(DOC_ID) {
            if targets.iter().any(|id| update_id != id) {
                return Err(WriteFailure::new(
                    VALIDATION_ERROR,
                    "the _id field of a document cannot be changed by an update",
                ));
            }
        }

        let mut modified = 0;
        if !update.is_empty() {
            for id in targets {
                if let Some(existing) = documents.get(id) {
                    let mut updated = existing.clone();
                    updated.merge(update);
                    if &updated != existing {
                        documents.insert(id.clone(), updated);
                        modified += 1;
                    }
                }
            }
        }

        log::debug!(
            "updated {} of {} matching document(s) in '{}'",
            modified,
            targets.len(),
            self.name
        );
        Ok(OperationOutcome::matched(targets.len() as u64, modified))
    }

    fn replace_by_filter(
        &self,
        filter: &Document,
        replacement: &Document,
        upsert: bool,
        _write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        self.apply_latency(timeout)?;

        let mut documents = self.documents.write();
        let matching = Self::matching_ids(&documents, filter);

        let Some(id) = matching.first() else {
            if !upsert {
                return Ok(OperationOutcome::matched(0, 0));
            }
            // a replacement is the whole new body; filter fields stay out
            let derived = Self::derive_upsert(filter, replacement, false)?;
            let id = self.insert_document(&mut documents, derived)?;
            log::debug!("upserted document {} into '{}'", id, self.name);
            return Ok(OperationOutcome::upserted(id));
        };

        // an empty replacement is a no-op matcher, never "replace with the
        // filter"
        if replacement.is_empty() {
            return Ok(OperationOutcome::matched(1, 0));
        }

        if let Some(replacement_id) = replacement.get(DOC_ID) {
            if replacement_id != id {
                return Err(WriteFailure::new(
                    VALIDATION_ERROR,
                    "the _id field of a replacement document cannot differ from the target's",
                ));
            }
        }

        let existing = documents.get(id).cloned().unwrap_or_default();
        let mut replaced = replacement.clone();
        replaced
            .put(DOC_ID, id.clone())
            .map_err(|err| WriteFailure::new(VALIDATION_ERROR, err.message()))?;

        let modified = if replaced != existing { 1 } else { 0 };
        documents.insert(id.clone(), replaced);
        log::debug!("replaced document {} in '{}'", id, self.name);
        Ok(OperationOutcome::matched(1, modified))
    }

    fn delete_by_filter(
        &self,
        filter: &Document,
        multi: bool,
        _write_concern: &WriteConcern,
        timeout: Option<Duration>,
    ) -> Result<OperationOutcome, WriteFailure> {
        self.apply_latency(timeout)?;

        let mut documents = self.documents.write();
        let matching = Self::matching_ids(&documents, filter);
        let targets: &[Value] = if multi {
            &matching
        } else {
            &matching[..matching.len().min(1)]
        };

        for id in targets {
            documents.shift_remove(id);
        }

        log::debug!("removed {} document(s) from '{}'", targets.len(), self.name);
        Ok(OperationOutcome::removed(targets.len() as u64))
    }

    fn write_concern(&self) -> Option<WriteConcern> {
        self.write_concern.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
