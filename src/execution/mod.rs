//! # Execution Engine
//!
//! Bounded-pool fan-out over partitioned slices with cooperative early stop,
//! progress reporting and thread-safe outcome aggregation.

pub mod engine;
mod pool;
pub mod progress;
pub mod result;

pub use engine::{execute, BatchExecutor, SliceProcessor};
pub use progress::ProgressSnapshot;
pub use result::{ExecutionResult, ExecutionSummary, TaskOutcome};
