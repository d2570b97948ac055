use crate::document::{Document, ObjectId};
use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Compare two doubles for equality with proper NaN handling.
#[inline]
fn num_eq_double(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Represents a [Document] value. It can be a simple value like [Value::Int32],
/// [Value::String] or a complex value like [Value::Document] or [Value::Array].
///
/// # Purpose
/// Provides a unified representation for all value types that can be stored in
/// a document: scalars (null, booleans, integers, doubles, strings), temporal
/// and identity types ([Value::Timestamp], [Value::ObjectId]), and structured
/// types (arrays and nested documents).
///
/// Every variant has an explicit constructor through a `From` implementation;
/// there is no implicit runtime coercion from arbitrary types.
///
/// # Equality
/// - Integers compare across widths: `Value::Int32(1) == Value::Int64(1)`.
/// - Doubles compare with NaN equal to NaN, so equality stays reflexive.
/// - `Value::Null` is a value in its own right; a key holding `Null` is not
///   the same as an absent key (that distinction lives in [Document]).
///
/// # Usage
/// Create values using the `From` trait or the `val!` macro:
/// ```text
/// let v1: Value = 42.into();           // From i32
/// let v2 = Value::from("hello");       // From &str
/// let v3 = val!([1, 2, 3]);            // Using macro
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 32-bit integer value.
    Int32(i32),
    /// Represents a signed 64-bit integer value.
    Int64(i64),
    /// Represents a 64-bit floating point value.
    Double(f64),
    /// Represents a string value.
    String(String),
    /// Represents a point in time, at millisecond precision.
    Timestamp(DateTime<Utc>),
    /// Represents a document identifier.
    ObjectId(ObjectId),
    /// Represents an array value.
    Array(Vec<Value>),
    /// Represents a nested document value.
    Document(Document),
}

impl Value {
    /// Checks if this value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Checks if this value is any integer variant.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int64(_))
    }

    /// Returns the boolean value, if this is a [Value::Bool].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer value widened to `i64`, if this is an integer variant.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the double value, if this is a [Value::Double].
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a [Value::String].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the timestamp value, if this is a [Value::Timestamp].
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the object id, if this is a [Value::ObjectId].
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Value::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the array, if this is a [Value::Array].
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the nested document, if this is a [Value::Document].
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_integer() && other.is_integer() {
            // cross-width integer comparison
            return self.as_integer() == other.as_integer();
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => *a == *b,
            (Value::Double(a), Value::Double(b)) => num_eq_double(*a, *b),
            (Value::String(a), Value::String(b)) => *a == *b,
            (Value::Timestamp(a), Value::Timestamp(b)) => *a == *b,
            (Value::ObjectId(a), Value::ObjectId(b)) => *a == *b,
            (Value::Array(a), Value::Array(b)) => *a == *b,
            (Value::Document(a), Value::Document(b)) => *a == *b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => (&"null_value").hash(state),
            Value::Bool(v) => v.hash(state),
            // integers hash through i64 so cross-width equality stays consistent
            Value::Int32(v) => (*v as i64).hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Double(v) => {
                // all NaN payloads are equal, and 0.0 == -0.0; collapse them
                // to one bit pattern so hashing stays consistent with equality
                let canonical = if v.is_nan() {
                    f64::NAN
                } else if *v == 0.0 {
                    0.0
                } else {
                    *v
                };
                canonical.to_bits().hash(state)
            }
            Value::String(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::ObjectId(v) => v.hash(state),
            Value::Array(v) => v.hash(state),
            Value::Document(v) => v.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Timestamp(v) => {
                write!(f, "\"{}\"", v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::ObjectId(v) => write!(f, "\"{}\"", v),
            Value::Array(values) => {
                write!(f, "[{}]", values.iter().map(|v| v.to_string()).join(", "))
            }
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}
