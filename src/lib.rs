#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Batch Fanout
//!
//! Balanced batch partitioning and bounded worker-pool fan-out for one-shot
//! bulk jobs over an in-memory dataset.
//!
//! ## Overview
//!
//! A run pages the dataset, groups the pages into at most `max_queue_length`
//! balanced slices, and hands one slice per task to a pool of at most
//! `worker_count` named threads. Each task records exactly one outcome; a run
//! configured to stop on error skips queued tasks after the first failure.
//! Progress is logged at a fixed interval while the pool drains.
//!
//! ## Module Organization
//!
//! - [`partition`] - Paging and balanced grouping
//! - [`execution`] - Executor, worker pool, progress and result aggregation
//! - [`config`] - Validated pool configuration and layered loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialisation
//!
//! ## Quick Start
//!
//! ```rust
//! use batch_fanout::{BatchExecutor, PoolConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PoolConfig::new(4, 8, 100, "import", true)?;
//! let executor = BatchExecutor::new(config)?;
//!
//! let rows: Vec<String> = (0..1_000).map(|i| format!("row-{i}")).collect();
//! let result = executor.execute(&rows, |pages: &[&[String]]| {
//!     let _rows: usize = pages.iter().map(|page| page.len()).sum();
//!     Ok(())
//! });
//!
//! assert!(result.is_success());
//! assert!(result.all_succeeded());
//! println!("finished in {}s", result.elapsed_secs());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod logging;
pub mod partition;

pub use config::{ConfigurationError, PoolConfig};
pub use error::{FanoutError, Result};
pub use execution::{
    execute, BatchExecutor, ExecutionResult, ExecutionSummary, ProgressSnapshot, SliceProcessor,
    TaskOutcome,
};
pub use partition::{group_balanced, paginate, partition, Page, Slice};
