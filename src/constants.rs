//! # System Constants
//!
//! Defaults that define the operational boundaries of a fan-out run when the
//! caller does not override them.

/// Worker threads per pool. Sized for IO-bound work: `2 * cpus + 1` on a
/// four-core host.
pub const DEFAULT_WORKER_COUNT: usize = 9;

/// Upper bound on the task queue, which is also the upper bound on slices.
pub const DEFAULT_MAX_QUEUE_LENGTH: usize = 2000;

/// Elements per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Cadence of progress log lines while the pool drains.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Label used when the caller does not name the run.
pub const DEFAULT_LABEL: &str = "fanout";

/// Prefix for configuration environment variables (`FANOUT_WORKER_COUNT`, ...).
pub const ENV_PREFIX: &str = "FANOUT";

/// Operation names used in structured log events
pub mod events {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_COMPLETED: &str = "run.completed";
    pub const RUN_FAILED: &str = "run.failed";
    pub const RUN_EMPTY: &str = "run.empty";
}
