//! # Result Aggregation
//!
//! Per-task outcomes are appended concurrently by worker threads into a
//! shared collector; once the pool has drained, the collector is consumed
//! into an immutable [`ExecutionResult`].
//!
//! Two independent failure layers are reported:
//!
//! - [`ExecutionResult::is_success`] - the run itself (partitioning, pool
//!   construction, worker threads) completed without an engine-level error.
//! - [`ExecutionResult::all_succeeded`] - at least one task ran and every task
//!   that ran returned normally.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::pool::RunState;
use crate::error::FanoutError;

/// Recorded result of one task, produced exactly once per processed slice
#[derive(Debug)]
pub struct TaskOutcome {
    slice_index: usize,
    error: Option<anyhow::Error>,
}

impl TaskOutcome {
    pub fn succeeded(slice_index: usize) -> Self {
        Self {
            slice_index,
            error: None,
        }
    }

    pub fn failed(slice_index: usize, error: anyhow::Error) -> Self {
        Self {
            slice_index,
            error: Some(error),
        }
    }

    /// Position of the processed slice in submission order
    pub fn slice_index(&self) -> usize {
        self.slice_index
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }
}

/// Thread-safe, append-only collection of task outcomes
#[derive(Debug, Default)]
pub(crate) struct OutcomeCollector {
    outcomes: Mutex<Vec<TaskOutcome>>,
}

impl OutcomeCollector {
    pub(crate) fn record(&self, outcome: TaskOutcome) {
        self.outcomes.lock().push(outcome);
    }

    /// Outcomes in completion order
    pub(crate) fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes.into_inner()
    }
}

/// Identity and clock of a single run, from start until the result is built
#[derive(Debug)]
pub(crate) struct RunContext {
    run_id: Uuid,
    label: String,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl RunContext {
    pub(crate) fn start(label: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            label: label.to_string(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub(crate) fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub(crate) fn finish(
        self,
        error: Option<FanoutError>,
        state: &RunState,
        outcomes: Vec<TaskOutcome>,
    ) -> ExecutionResult {
        ExecutionResult {
            run_id: self.run_id,
            label: self.label,
            success: error.is_none(),
            error,
            outcomes,
            total_slices: state.total(),
            skipped_tasks: state.skipped(),
            rejected_tasks: state.rejected(),
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Immutable snapshot of a finished run
#[derive(Debug)]
pub struct ExecutionResult {
    run_id: Uuid,
    label: String,
    success: bool,
    error: Option<FanoutError>,
    outcomes: Vec<TaskOutcome>,
    total_slices: usize,
    skipped_tasks: usize,
    rejected_tasks: usize,
    started_at: DateTime<Utc>,
    elapsed: Duration,
}

impl ExecutionResult {
    /// Result for a run that failed before any engine state existed
    pub(crate) fn from_error(label: &str, error: FanoutError) -> Self {
        RunContext::start(label).finish(Some(error), &RunState::new(false), Vec::new())
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when the run mechanism completed without an engine-level error.
    /// Task failures do not affect this flag; see [`Self::all_succeeded`].
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Engine-level error that ended the run, if any
    pub fn error(&self) -> Option<&FanoutError> {
        self.error.as_ref()
    }

    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    /// True iff at least one task ran and every recorded outcome is a success.
    /// A run where nothing executed is not considered all-succeeded.
    pub fn all_succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(TaskOutcome::is_success)
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// Number of slices the dataset was partitioned into
    pub fn total_slices(&self) -> usize {
        self.total_slices
    }

    /// Tasks that never ran because an earlier failure stopped dispatch
    pub fn skipped_tasks(&self) -> usize {
        self.skipped_tasks
    }

    /// Tasks the pool refused to enqueue
    pub fn rejected_tasks(&self) -> usize {
        self.rejected_tasks
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed wall time in whole seconds
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            run_id: self.run_id,
            label: self.label.clone(),
            success: self.success,
            error: self.error.as_ref().map(ToString::to_string),
            all_succeeded: self.all_succeeded(),
            total_slices: self.total_slices,
            succeeded: self.succeeded_count(),
            failed: self.failed_count(),
            skipped: self.skipped_tasks,
            rejected: self.rejected_tasks,
            started_at: self.started_at,
            elapsed_secs: self.elapsed_secs(),
        }
    }
}

/// Serializable digest of an [`ExecutionResult`] for logs and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub run_id: Uuid,
    pub label: String,
    pub success: bool,
    pub error: Option<String>,
    pub all_succeeded: bool,
    pub total_slices: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
}
