//! # Progress Reporting
//!
//! Advisory progress output while a pool drains. Reporting is driven by the
//! coordinator's wait loop and has no bearing on completion detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::info;

use super::pool::RunState;

/// Point-in-time view of finished tasks against the slice count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion percentage; an empty run counts as fully complete
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.0}%)",
            self.completed,
            self.total,
            self.percent()
        )
    }
}

pub(crate) struct ProgressReporter<'a> {
    label: &'a str,
    state: &'a RunState,
    interval: Duration,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(label: &'a str, state: &'a RunState, interval: Duration) -> Self {
        Self {
            label,
            state,
            interval,
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.state.completed(), self.state.total())
    }

    pub(crate) fn report(&self) {
        let snapshot = self.snapshot();
        info!(
            label = %self.label,
            completed = snapshot.completed,
            total = snapshot.total,
            "📊 PROGRESS: '{}' executed tasks {}",
            self.label,
            snapshot
        );
    }

    pub(crate) fn report_final(&self) {
        let snapshot = self.snapshot();
        info!(
            label = %self.label,
            completed = snapshot.completed,
            skipped = self.state.skipped(),
            total = snapshot.total,
            complete = snapshot.is_complete(),
            "🏁 PROGRESS: '{}' drained, executed tasks {}",
            self.label,
            snapshot
        );
    }
}
