//! The document model: ordered key/value documents, typed values, and
//! client-side generated object ids.

mod document;
mod object_id;
mod value;

pub use document::*;
pub use object_id::ObjectId;
pub use value::*;
