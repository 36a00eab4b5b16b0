//! # Fan-out Error Types
//!
//! Structured error handling for partitioning and pool execution using
//! thiserror. Errors raised by the caller's processing function are not part
//! of this taxonomy; they are captured per task as `anyhow::Error`.

use thiserror::Error;

use crate::config::ConfigurationError;

/// Engine-level error types
#[derive(Error, Debug)]
pub enum FanoutError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Leftover pages outnumber the slices they should be spread over. Only a
    /// defect in the grouping arithmetic can produce this.
    #[error("Partition invariant violated: {leftover} leftover pages cannot be spread over {groups} groups")]
    PartitionInvariant { leftover: usize, groups: usize },

    #[error("Failed to construct worker pool '{label}': {message}")]
    PoolConstruction { label: String, message: String },

    #[error("Worker thread '{worker}' panicked outside of task processing")]
    WorkerPanicked { worker: String },

    #[error("Blocking execution task failed: {message}")]
    BlockingTask { message: String },
}

impl FanoutError {
    pub fn pool_construction(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PoolConstruction {
            label: label.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FanoutError>;
