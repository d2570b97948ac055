use crate::common::DOC_ID;
use crate::document::{ObjectId, Value};
use crate::errors::{BulkriteError, ErrorKind, BulkriteResult};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

/// Represents a document: an insertion-ordered mapping from string keys to
/// typed [Value]s.
///
/// Keys within one document are unique. Insertion order is preserved for
/// serialization fidelity, but is irrelevant to equality: two documents with
/// the same key/value pairs in different orders are equal.
///
/// A key holding [Value::Null] is distinct from an absent key. [Document::get]
/// therefore returns `Option<&Value>` rather than substituting `Null` for a
/// missing key, and the distinction survives serialization.
///
/// The `_id` field, when present, acts as the implicit primary key of the
/// document. [Document::id] generates a fresh [ObjectId] for documents that
/// do not have one yet.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::doc;
///
/// let mut doc = doc! { "name": "Alice", "age": 30 };
/// assert_eq!(doc.size(), 2);
/// assert!(doc.contains("name"));
/// assert!(doc.get("missing").is_none());
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of entries in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key in this
    /// document. If the key already exists, its value is replaced and its
    /// position in the insertion order is kept.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::InvalidOperation`] if the key is
    /// empty.
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) -> BulkriteResult<()> {
        let key = key.into();
        // key cannot be empty
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(BulkriteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data.insert(key, value.into());
        Ok(())
    }

    /// Returns the [Value] associated with the specified key, or `None` if
    /// this document contains no mapping for the key.
    ///
    /// A key mapped to [Value::Null] returns `Some(&Value::Null)`, which is
    /// distinct from an absent key returning `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Checks if this document contains a mapping for the specified key.
    ///
    /// A key mapped to [Value::Null] is still contained.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the key and its value from the document. Removing a
    /// non-existent key succeeds without error.
    pub fn remove(&mut self, key: &str) {
        self.data.shift_remove(key);
    }

    /// Returns the `_id` value of this document, generating and assigning a
    /// fresh [ObjectId] if the document does not have one yet.
    pub fn id(&mut self) -> Value {
        if let Some(id) = self.data.get(DOC_ID) {
            id.clone()
        } else {
            // if _id field is not populated already, create a new id
            // and set it in the document
            let id = Value::ObjectId(ObjectId::new());
            self.data.insert(DOC_ID.to_string(), id.clone());
            id
        }
    }

    /// Checks if this document has an `_id` field.
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Returns an iterator over the entries of this document, in insertion
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Returns an iterator over the keys of this document, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Copies every field of `other` into this document, replacing values for
    /// keys that already exist.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // structural, order-insensitive; a Null value only matches a present
        // Null value, never an absent key
        self.data == other.data
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // order-insensitive to stay consistent with equality: fold the
        // per-entry hashes with XOR before feeding the outer hasher
        let mut acc: u64 = 0;
        for (key, value) in &self.data {
            let mut entry_hasher = std::collections::hash_map::DefaultHasher::new();
            key.hash(&mut entry_hasher);
            value.hash(&mut entry_hasher);
            acc ^= entry_hasher.finish();
        }
        self.data.len().hash(state);
        acc.hash(state);
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(key, value)| format!("\"{}\": {}", key, value))
                .join(", ")
        )
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Strips the surrounding quotes that `stringify!` adds to string-literal
/// keys in the [`doc!`](crate::doc) macro.
pub fn normalize(key: &str) -> String {
    key.trim_matches('"').to_string()
}

/// Creates a [Document] from key/value pairs.
///
/// Keys can be bare identifiers or string literals; values can be literals,
/// expressions, nested `{ .. }` documents, or `[ .. ]` arrays.
///
/// # Examples
///
/// ```rust,ignore
/// let doc = doc! {
///     "name": "Alice",
///     "age": 30,
///     "address": {
///         "city": "New York",
///         "zip": 10001
///     },
///     "tags": ["admin", "user"]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    // match an empty document
    () => {
        $crate::document::Document::new()
    };

    // match a document with key value pairs
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::val;

            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::val!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the [`doc!`](crate::doc) macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! val {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::document::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::document::Value::Array(vec![$($crate::val!($value)),*])
    };

    // match an expression (variable, function call, literal, etc.)
    ($value:expr) => {
        $crate::document::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> Document {
        doc! {
            score: 1034,
            location: {
                state: "NY",
                city: "New York",
                address: {
                    line1: "40",
                    zip: 10001,
                },
            },
            category: ["food", "produce", "grocery"],
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\"ABC\""), "ABC");
        assert_eq!(normalize("ABC"), "ABC");
    }

    #[test]
    fn test_new_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.size(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "Alice").unwrap();
        doc.put("age", 30).unwrap();

        assert_eq!(doc.size(), 2);
        assert_eq!(doc.get("name"), Some(&Value::String("Alice".to_string())));
        assert_eq!(doc.get("age"), Some(&Value::Int32(30)));
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn test_put_replaces_existing_key() {
        let mut doc = doc! { status: "inactive" };
        doc.put("status", "active").unwrap();
        assert_eq!(doc.size(), 1);
        assert_eq!(doc.get("status"), Some(&Value::String("active".to_string())));
    }

    #[test]
    fn test_put_rejects_empty_key() {
        let mut doc = Document::new();
        let result = doc.put("", 1);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_contains_distinguishes_null_from_absent() {
        let mut doc = Document::new();
        doc.put("members", Value::Null).unwrap();

        assert!(doc.contains("members"));
        assert_eq!(doc.get("members"), Some(&Value::Null));
        assert!(!doc.contains("pets"));
        assert!(doc.get("pets").is_none());
    }

    #[test]
    fn test_null_key_not_equal_to_absent_key() {
        let with_null = doc! { name: "family", members: (Value::Null) };
        let without_key = doc! { name: "family" };

        assert_ne!(with_null, without_key);
    }

    #[test]
    fn test_equality_is_order_insensitive() {
        let mut a = Document::new();
        a.put("x", 1).unwrap();
        a.put("y", 2).unwrap();

        let mut b = Document::new();
        b.put("y", 2).unwrap();
        b.put("x", 1).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_uses_cross_width_integers() {
        let a = doc! { n: 1 };
        let b = doc! { n: 1i64 };
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove() {
        let mut doc = doc! { name: "Alice", age: 30 };
        doc.remove("age");
        assert_eq!(doc.size(), 1);
        assert!(doc.get("age").is_none());

        // removing a non-existent key succeeds
        doc.remove("missing");
        assert_eq!(doc.size(), 1);
    }

    #[test]
    fn test_id_generates_object_id_when_absent() {
        let mut doc = doc! { name: "Alice" };
        assert!(!doc.has_id());

        let id = doc.id();
        assert!(doc.has_id());
        assert!(matches!(id, Value::ObjectId(_)));

        // stable once assigned
        assert_eq!(doc.id(), id);
    }

    #[test]
    fn test_id_returns_existing_value() {
        let mut doc = doc! { "_id": "money" };
        assert!(doc.has_id());
        assert_eq!(doc.id(), Value::String("money".to_string()));
    }

    #[test]
    fn test_merge() {
        let mut doc = doc! { counter: 1, label: "old" };
        let update = doc! { label: "new", extra: true };
        doc.merge(&update);

        assert_eq!(doc.size(), 3);
        assert_eq!(doc.get("counter"), Some(&Value::Int32(1)));
        assert_eq!(doc.get("label"), Some(&Value::String("new".to_string())));
        assert_eq!(doc.get("extra"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let doc = doc! { c: 1, a: 2, b: 3 };
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_doc_macro_nested() {
        let doc = set_up();
        assert_eq!(doc.size(), 3);
        assert_eq!(doc.get("score"), Some(&Value::Int32(1034)));

        let location = doc.get("location").and_then(|v| v.as_document()).unwrap();
        assert_eq!(location.get("state"), Some(&Value::String("NY".to_string())));

        let address = location.get("address").and_then(|v| v.as_document()).unwrap();
        assert_eq!(address.get("zip"), Some(&Value::Int32(10001)));

        let category = doc.get("category").and_then(|v| v.as_array()).unwrap();
        assert_eq!(category.len(), 3);
    }

    #[test]
    fn test_display_preserves_insertion_order() {
        let doc = doc! { b: 2, a: 1 };
        assert_eq!(doc.to_string(), "{\"b\": 2, \"a\": 1}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_null_vs_absent_survives_serialization() {
        let with_null = doc! { name: "family", members: (Value::Null) };
        let without_key = doc! { name: "family" };

        let with_null_json = serde_json::to_string(&with_null).unwrap();
        let without_key_json = serde_json::to_string(&without_key).unwrap();
        assert_ne!(with_null_json, without_key_json);

        let with_null_back: Document = serde_json::from_str(&with_null_json).unwrap();
        let without_key_back: Document = serde_json::from_str(&without_key_json).unwrap();

        assert_eq!(with_null_back, with_null);
        assert_eq!(without_key_back, without_key);
        assert_ne!(with_null_back, without_key_back);

        assert!(with_null_back.contains("members"));
        assert!(!without_key_back.contains("members"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialization_round_trip_preserves_order() {
        let doc = set_up();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(back, doc);
        let keys: Vec<&String> = back.keys().collect();
        assert_eq!(keys, vec!["score", "location", "category"]);
    }
}
