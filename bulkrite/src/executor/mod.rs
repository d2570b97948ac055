//! Batch execution and result aggregation.
//!
//! [BulkExecutor] runs a [Batch](crate::batch::Batch) against a
//! [Collection](crate::collection::Collection) handle, merging the outcome of
//! every dispatched operation into a single [BulkResult]. Ordered batches run
//! sequentially and halt at the first failure; unordered batches attempt
//! every request, concurrently when the batch is large enough.

pub mod bulk_executor;
pub mod result_aggregator;

pub use bulk_executor::BulkExecutor;
pub use result_aggregator::{BulkResult, BulkWriteFailure, ResultAggregator, Upsert, WriteError};
