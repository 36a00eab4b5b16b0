//! # Pool Configuration
//!
//! A single validated record describing how a fan-out run is shaped: how many
//! workers, how many slices at most, how many elements per page, and whether
//! the first task failure stops the dispatch of queued work.
//!
//! Validation happens once, when the record is built through
//! [`PoolConfig::new`] or loaded through [`PoolConfig::load`]. The executor
//! validates again on construction so hand-assembled records cannot bypass it.
//!
//! ## Usage
//!
//! ```rust
//! use batch_fanout::config::PoolConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PoolConfig::new(4, 16, 100, "reindex", true)?;
//! assert_eq!(config.progress_interval().as_millis(), 500);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_LABEL, DEFAULT_MAX_QUEUE_LENGTH, DEFAULT_PAGE_SIZE, DEFAULT_PROGRESS_INTERVAL_MS,
    DEFAULT_WORKER_COUNT,
};

pub use error::{ConfigResult, ConfigurationError};

/// Shape of a fan-out run. Immutable once handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of worker threads
    pub worker_count: usize,

    /// Task queue capacity, which also bounds the number of slices
    pub max_queue_length: usize,

    /// Elements per page
    pub page_size: usize,

    /// Diagnostic label used in log lines and worker thread names
    pub label: String,

    /// Skip queued tasks once any task has failed
    pub stop_on_error: bool,

    /// Cadence of progress reporting while the pool drains
    pub progress_interval_ms: u64,
}

impl PoolConfig {
    /// Build a validated configuration with the default progress interval.
    pub fn new(
        worker_count: usize,
        max_queue_length: usize,
        page_size: usize,
        label: impl Into<String>,
        stop_on_error: bool,
    ) -> ConfigResult<Self> {
        let config = Self {
            worker_count,
            max_queue_length,
            page_size,
            label: label.into(),
            stop_on_error,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every setting and the queue/worker coupling.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count < 1 {
            return Err(ConfigurationError::invalid_value(
                "worker_count",
                self.worker_count as u64,
                "worker count must be at least 1",
            ));
        }

        if self.max_queue_length < 1 {
            return Err(ConfigurationError::invalid_value(
                "max_queue_length",
                self.max_queue_length as u64,
                "max queue length must be at least 1",
            ));
        }

        if self.page_size < 1 {
            return Err(ConfigurationError::invalid_value(
                "page_size",
                self.page_size as u64,
                "page size must be at least 1",
            ));
        }

        if self.progress_interval_ms < 1 {
            return Err(ConfigurationError::invalid_value(
                "progress_interval_ms",
                self.progress_interval_ms,
                "progress interval must be at least 1ms",
            ));
        }

        if self.max_queue_length < self.worker_count {
            return Err(ConfigurationError::QueueShorterThanWorkers {
                max_queue_length: self.max_queue_length,
                worker_count: self.worker_count,
            });
        }

        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            page_size: DEFAULT_PAGE_SIZE,
            label: DEFAULT_LABEL.to_string(),
            stop_on_error: false,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}
