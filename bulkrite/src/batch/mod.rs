//! Batch construction: validated write requests, the fluent batch builder,
//! and the immutable batch it produces.

mod batch_builder;
mod write_request;

pub use batch_builder::*;
pub use write_request::*;
