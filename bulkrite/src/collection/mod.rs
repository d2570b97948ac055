//! The collection collaborator: the provider trait the bulk executor
//! dispatches against, write-durability policies, per-operation outcomes,
//! and an in-memory provider.

mod collection;
mod memory_collection;
mod outcome;
mod write_concern;

pub use collection::*;
pub use memory_collection::*;
pub use outcome::*;
pub use write_concern::*;
