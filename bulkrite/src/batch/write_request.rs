use crate::document::Document;
use crate::errors::{BulkriteError, ErrorKind, BulkriteResult};
use std::fmt::Display;

/// The kind of a [WriteRequest].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Insert a new document.
    Insert,
    /// Update the first document matching the filter.
    UpdateOne,
    /// Update every document matching the filter.
    UpdateMany,
    /// Replace the first document matching the filter.
    ReplaceOne,
    /// Remove the first document matching the filter.
    RemoveOne,
    /// Remove every document matching the filter.
    RemoveMany,
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Insert => write!(f, "insert"),
            RequestKind::UpdateOne => write!(f, "update-one"),
            RequestKind::UpdateMany => write!(f, "update-many"),
            RequestKind::ReplaceOne => write!(f, "replace-one"),
            RequestKind::RemoveOne => write!(f, "remove-one"),
            RequestKind::RemoveMany => write!(f, "remove-many"),
        }
    }
}

/// A single validated write operation inside a batch.
///
/// A `WriteRequest` carries its [RequestKind], an optional filter (the
/// predicate document selecting targets), an optional payload (the document
/// to insert, the update to merge, or the replacement body), and the upsert
/// flag. Construction validates the shape per kind and fails with
/// [`ErrorKind::InvalidRequest`] on violations, so a malformed request is
/// rejected locally and never reaches the collection collaborator.
///
/// Requests are immutable after construction.
///
/// # Shape per kind
///
/// | kind        | filter   | payload  | upsert  |
/// |-------------|----------|----------|---------|
/// | Insert      | none     | required | no      |
/// | UpdateOne   | required | required | allowed |
/// | UpdateMany  | required | required | allowed |
/// | ReplaceOne  | required | required | allowed |
/// | RemoveOne   | required | none     | no      |
/// | RemoveMany  | required | none     | no      |
///
/// A required filter or payload may still be an empty document: an empty
/// filter matches everything, and an empty payload is a no-op matcher that
/// must never be substituted by the filter downstream.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteRequest {
    kind: RequestKind,
    filter: Option<Document>,
    payload: Option<Document>,
    upsert: bool,
}

impl WriteRequest {
    /// Creates a new `WriteRequest`, validating the filter/payload/upsert
    /// shape for the given kind.
    pub fn new(
        kind: RequestKind,
        filter: Option<Document>,
        payload: Option<Document>,
        upsert: bool,
    ) -> BulkriteResult<Self> {
        let invalid = |message: &str| {
            log::error!("{}", message);
            Err(BulkriteError::new(message, ErrorKind::InvalidRequest))
        };

        match kind {
            RequestKind::Insert => {
                if payload.is_none() {
                    return invalid("Insert requires a document payload");
                }
                if filter.is_some() {
                    return invalid("Insert does not take a filter");
                }
                if upsert {
                    return invalid("Insert does not take an upsert flag");
                }
            }
            RequestKind::UpdateOne | RequestKind::UpdateMany | RequestKind::ReplaceOne => {
                if filter.is_none() {
                    return invalid("Update and replace require a filter");
                }
                if payload.is_none() {
                    return invalid("Update and replace require a payload document");
                }
            }
            RequestKind::RemoveOne | RequestKind::RemoveMany => {
                if filter.is_none() {
                    return invalid("Remove requires a filter");
                }
                if payload.is_some() {
                    return invalid("Remove does not take a payload");
                }
                if upsert {
                    return invalid("Remove does not take an upsert flag");
                }
            }
        }

        Ok(WriteRequest {
            kind,
            filter,
            payload,
            upsert,
        })
    }

    /// Creates an insert request.
    pub fn insert(document: Document) -> BulkriteResult<Self> {
        WriteRequest::new(RequestKind::Insert, None, Some(document), false)
    }

    /// Creates an update request targeting the first match.
    pub fn update_one(filter: Document, update: Document, upsert: bool) -> BulkriteResult<Self> {
        WriteRequest::new(RequestKind::UpdateOne, Some(filter), Some(update), upsert)
    }

    /// Creates an update request targeting every match.
    pub fn update_many(filter: Document, update: Document, upsert: bool) -> BulkriteResult<Self> {
        WriteRequest::new(RequestKind::UpdateMany, Some(filter), Some(update), upsert)
    }

    /// Creates a replace request targeting the first match.
    pub fn replace_one(
        filter: Document,
        replacement: Document,
        upsert: bool,
    ) -> BulkriteResult<Self> {
        WriteRequest::new(
            RequestKind::ReplaceOne,
            Some(filter),
            Some(replacement),
            upsert,
        )
    }

    /// Creates a remove request targeting the first match.
    pub fn remove_one(filter: Document) -> BulkriteResult<Self> {
        WriteRequest::new(RequestKind::RemoveOne, Some(filter), None, false)
    }

    /// Creates a remove request targeting every match.
    pub fn remove_many(filter: Document) -> BulkriteResult<Self> {
        WriteRequest::new(RequestKind::RemoveMany, Some(filter), None, false)
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn filter(&self) -> Option<&Document> {
        self.filter.as_ref()
    }

    pub fn payload(&self) -> Option<&Document> {
        self.payload.as_ref()
    }

    pub fn is_upsert(&self) -> bool {
        self.upsert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_insert_requires_payload() {
        let result = WriteRequest::new(RequestKind::Insert, None, None, false);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_insert_rejects_filter() {
        let result = WriteRequest::new(
            RequestKind::Insert,
            Some(doc! { x: 1 }),
            Some(doc! { y: 2 }),
            false,
        );
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_insert_rejects_upsert() {
        let result = WriteRequest::new(RequestKind::Insert, None, Some(doc! { y: 2 }), true);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_update_requires_filter_and_payload() {
        let result = WriteRequest::new(RequestKind::UpdateOne, None, Some(doc! {}), false);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);

        let result = WriteRequest::new(RequestKind::UpdateMany, Some(doc! {}), None, false);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_remove_rejects_payload_and_upsert() {
        let result = WriteRequest::new(
            RequestKind::RemoveOne,
            Some(doc! {}),
            Some(doc! { x: 1 }),
            false,
        );
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);

        let result = WriteRequest::new(RequestKind::RemoveMany, Some(doc! {}), None, true);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_constructors_build_valid_requests() {
        let insert = WriteRequest::insert(doc! { n: 1 }).unwrap();
        assert_eq!(insert.kind(), RequestKind::Insert);
        assert!(insert.filter().is_none());
        assert_eq!(insert.payload(), Some(&doc! { n: 1 }));
        assert!(!insert.is_upsert());

        let update = WriteRequest::update_many(doc! {}, doc! { n: 2 }, true).unwrap();
        assert_eq!(update.kind(), RequestKind::UpdateMany);
        assert!(update.is_upsert());

        let replace = WriteRequest::replace_one(doc! { n: 1 }, doc! { n: 3 }, false).unwrap();
        assert_eq!(replace.kind(), RequestKind::ReplaceOne);

        let remove = WriteRequest::remove_one(doc! { n: 1 }).unwrap();
        assert_eq!(remove.kind(), RequestKind::RemoveOne);
        assert!(remove.payload().is_none());
    }

    #[test]
    fn test_empty_filter_and_payload_are_legal() {
        // empty documents are meaningful: an empty filter matches everything
        // and an empty payload is a no-op matcher
        let update = WriteRequest::update_one(doc! {}, doc! {}, true).unwrap();
        assert_eq!(update.filter(), Some(&doc! {}));
        assert_eq!(update.payload(), Some(&doc! {}));
    }

    #[test]
    fn test_request_kind_display() {
        assert_eq!(RequestKind::Insert.to_string(), "insert");
        assert_eq!(RequestKind::UpdateMany.to_string(), "update-many");
        assert_eq!(RequestKind::RemoveOne.to_string(), "remove-one");
    }
}
