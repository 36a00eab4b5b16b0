//! # Batch Executor
//!
//! Coordinates one fan-out run: partitions the dataset into slices, starts a
//! bounded pool sized to the slice count, submits one task per slice, and
//! waits for the pool to drain while reporting progress.
//!
//! Task failures never escape [`BatchExecutor::execute`]; they are recorded as
//! [`TaskOutcome`](super::TaskOutcome)s. Engine-level failures (partitioning,
//! pool construction, worker threads) are captured into the returned
//! [`ExecutionResult`] with `is_success() == false`. Only configuration errors
//! are returned to the caller directly, and only from construction.
//!
//! ```rust
//! use batch_fanout::config::PoolConfig;
//! use batch_fanout::execution::BatchExecutor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = BatchExecutor::new(PoolConfig::new(2, 4, 2, "doc", false)?)?;
//! let data: Vec<u32> = (1..=5).collect();
//!
//! let result = executor.execute(&data, |pages: &[&[u32]]| {
//!     for page in pages {
//!         for item in page.iter() {
//!             let _ = item * 2;
//!         }
//!     }
//!     Ok(())
//! });
//!
//! assert!(result.is_success());
//! assert!(result.all_succeeded());
//! # Ok(())
//! # }
//! ```

use std::thread;
use tracing::{debug, error, info, instrument};

use super::pool::{PoolSpec, RunState, WorkerPool};
use super::progress::ProgressReporter;
use super::result::{ExecutionResult, OutcomeCollector, RunContext};
use crate::config::{ConfigResult, PoolConfig};
use crate::constants::{events, DEFAULT_LABEL};
use crate::error::{FanoutError, Result};
use crate::logging::log_execution_event;
use crate::partition::{partition, Page};

/// Caller-supplied work applied to one slice (a sequence of pages).
///
/// Implemented for every `Fn(&[&[T]]) -> anyhow::Result<()> + Sync` closure.
pub trait SliceProcessor<T>: Sync {
    fn process(&self, slice: &[Page<'_, T>]) -> anyhow::Result<()>;
}

impl<T, F> SliceProcessor<T> for F
where
    F: Fn(&[Page<'_, T>]) -> anyhow::Result<()> + Sync,
{
    fn process(&self, slice: &[Page<'_, T>]) -> anyhow::Result<()> {
        self(slice)
    }
}

/// Runs datasets through a bounded worker pool according to a [`PoolConfig`]
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    config: PoolConfig,
}

impl BatchExecutor {
    /// Create an executor, rejecting invalid configuration before any work
    pub fn new(config: PoolConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Process `data` with a closure, one call per slice
    pub fn execute<T, F>(&self, data: &[T], process: F) -> ExecutionResult
    where
        T: Sync,
        F: Fn(&[Page<'_, T>]) -> anyhow::Result<()> + Sync,
    {
        self.execute_with(data, &process)
    }

    /// Process `data` with any [`SliceProcessor`], one call per slice
    #[instrument(skip_all, fields(label = %self.config.label, elements = data.len()))]
    pub fn execute_with<T, P>(&self, data: &[T], processor: &P) -> ExecutionResult
    where
        T: Sync,
        P: SliceProcessor<T> + ?Sized,
    {
        let label = self.config.label.as_str();
        let run = RunContext::start(label);

        info!("🚀 FANOUT: '{}' processing started", label);
        log_execution_event(events::RUN_STARTED, label, Some(run.run_id()), "started", None);

        let state = RunState::new(self.config.stop_on_error);
        let collector = OutcomeCollector::default();

        let dispatched = self.dispatch(data, processor, &state, &collector);
        let outcomes = collector.into_outcomes();

        let result = match dispatched {
            Ok(()) => run.finish(None, &state, outcomes),
            Err(e) => {
                error!("❌ FANOUT: '{}' failed to run: {}", label, e);
                run.finish(Some(e), &state, outcomes)
            }
        };

        self.log_result(&result);
        result
    }

    /// Run [`Self::execute`] on tokio's blocking pool so async callers are
    /// not stalled while the pool drains.
    pub async fn execute_async<T, F>(&self, data: Vec<T>, process: F) -> ExecutionResult
    where
        T: Send + Sync + 'static,
        F: Fn(&[Page<'_, T>]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let executor = self.clone();
        let handle = tokio::task::spawn_blocking(move || executor.execute(&data, process));

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "❌ FANOUT: '{}' blocking execution task failed: {}",
                    self.config.label, e
                );
                ExecutionResult::from_error(
                    &self.config.label,
                    FanoutError::BlockingTask {
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    fn dispatch<T, P>(
        &self,
        data: &[T],
        processor: &P,
        state: &RunState,
        collector: &OutcomeCollector,
    ) -> Result<()>
    where
        T: Sync,
        P: SliceProcessor<T> + ?Sized,
    {
        let label = self.config.label.as_str();
        let slices = partition(data, self.config.page_size, self.config.max_queue_length)?;
        let total = slices.len();
        state.set_total(total);

        if total == 0 {
            info!("📭 FANOUT: '{}' has no data to process", label);
            return Ok(());
        }

        let spec = PoolSpec {
            label,
            worker_count: self.config.worker_count.min(total),
            queue_capacity: total,
        };
        info!(
            "📦 FANOUT: '{}' actual queue length {}, {} workers",
            label, spec.queue_capacity, spec.worker_count
        );

        let reporter = ProgressReporter::new(label, state, self.config.progress_interval());

        thread::scope(|scope| {
            let pool = WorkerPool::start(scope, spec, state, collector, processor)?;

            pool.submit_all(slices);
            pool.await_termination(&reporter)
        })
    }

    fn log_result(&self, result: &ExecutionResult) {
        let label = self.config.label.as_str();
        let summary = result.summary();

        let (operation, status) = if !result.is_success() {
            (events::RUN_FAILED, "failed")
        } else if result.total_slices() == 0 {
            (events::RUN_EMPTY, "empty")
        } else {
            (events::RUN_COMPLETED, "completed")
        };
        log_execution_event(
            operation,
            label,
            Some(result.run_id()),
            status,
            summary.error.as_deref(),
        );

        info!(
            "✅ FANOUT: '{}' finished in {}s: {} succeeded, {} failed, {} skipped",
            label, summary.elapsed_secs, summary.succeeded, summary.failed, summary.skipped
        );
        debug!(
            "Execution summary: {}",
            serde_json::to_string(&summary).unwrap_or_else(|_| "[serialization error]".to_string())
        );
    }
}

/// One-shot fan-out with explicit settings.
///
/// Validates the settings first; an invalid combination (for example
/// `max_slices < max_workers`) is returned as an error and nothing runs.
pub fn execute<T, F>(
    data: &[T],
    page_size: usize,
    max_workers: usize,
    max_slices: usize,
    stop_on_error: bool,
    process: F,
) -> ConfigResult<ExecutionResult>
where
    T: Sync,
    F: Fn(&[Page<'_, T>]) -> anyhow::Result<()> + Sync,
{
    let config = PoolConfig::new(max_workers, max_slices, page_size, DEFAULT_LABEL, stop_on_error)?;
    Ok(BatchExecutor::new(config)?.execute(data, process))
}
