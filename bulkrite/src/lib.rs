#![allow(
    dead_code,
    unused_imports,
)]
//! # Bulkrite - Bulk Write Batching Engine
//!
//! Bulkrite collects heterogeneous document write operations into batches
//! and executes them against a pluggable collection backend with precise,
//! mode-dependent failure semantics.
//!
//! ## Key Features
//!
//! - **Batching**: Inserts, updates, replacements, and removals mixed freely
//!   in a single batch, built through a fluent builder API
//! - **Ordered Execution**: Requests run in submission order and the first
//!   failure halts the batch; later requests are never attempted
//! - **Unordered Execution**: Every request is attempted exactly once,
//!   concurrently across worker threads when the batch is large enough
//! - **Rich Results**: Per-category counts, upsert ids, and per-request
//!   errors attributed to the original request index
//! - **Write Concern Cascade**: Executor settings override collection
//!   defaults, with acknowledged writes as the final fallback
//! - **Documents**: Insertion-ordered documents with a dynamic value model
//!   that distinguishes a null field from an absent one
//! - **Pluggable Backends**: Any `CollectionProvider` implementation plugs
//!   in; an in-memory collection ships for testing and embedding
//! - **Clean API**: PIMPL pattern provides stable, encapsulated interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bulkrite::batch::{BatchBuilder, BatchMode};
//! use bulkrite::collection::{Collection, MemoryCollection};
//! use bulkrite::executor::BulkExecutor;
//! use bulkrite::doc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let collection = Collection::new(MemoryCollection::new("bulkops"));
//! let executor = BulkExecutor::new(collection);
//!
//! let mut builder = BatchBuilder::new();
//! builder.insert(doc! { document: "first" })?;
//! builder.find(doc! { document: "first" }).update_one(doc! { seen: true })?;
//! builder.find(doc! { document: "missing" }).upsert().update_one(doc! { seen: false })?;
//!
//! let result = executor.execute(builder.build(BatchMode::Ordered))?;
//! assert_eq!(result.inserted_count(), 1);
//! assert_eq!(result.modified_count(), 1);
//! assert_eq!(result.upserted_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Semantics
//!
//! Individual operation failures are never raised mid-batch. They are
//! recorded against the request index that caused them and reported at the
//! end as a single [BulkWriteFailure](executor::BulkWriteFailure) that still
//! carries the full [BulkResult](executor::BulkResult), so partial progress
//! is always recoverable from a failed batch.
//!
//! ## Module Organization
//!
//! - [`batch`] - Write requests, the batch builder, and execution modes
//! - [`collection`] - The collection collaborator trait, write concerns,
//!   per-operation outcomes, and the in-memory backend
//! - [`document`] - Documents, dynamic values, and object ids
//! - [`errors`] - Error types and the crate-wide result alias
//! - [`executor`] - Batch execution and result aggregation

use std::thread::available_parallelism;

pub mod batch;
pub mod collection;
pub mod common;
pub mod document;
pub mod errors;
pub mod executor;

/// Returns the number of available CPU cores.
///
/// This function attempts to detect the number of available processors on the system.
/// If detection fails, it defaults to 1.
///
/// # Returns
///
/// A `usize` representing the number of available CPU cores.
///
/// # Examples
///
/// ```rust
/// use bulkrite::get_cpu_count;
///
/// let cpu_count = get_cpu_count();
/// println!("Available CPUs: {}", cpu_count);
/// assert!(cpu_count > 0);
/// ```
pub fn get_cpu_count() -> usize {
    available_parallelism()
        .map(|p| p.get())
        .unwrap_or_else(|err| {
            log::warn!("Failed to detect available parallelism: {}. Defaulting to single thread.", err);
            1
        })
}
