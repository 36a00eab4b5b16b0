//! # Bounded Worker Pool
//!
//! A fixed set of named worker threads pulling slice tasks from a bounded
//! queue. Workers run as scoped threads so slices can borrow the caller's data.
//!
//! Early stop is cooperative: once a task has failed and the run stops on
//! error, the next worker to dequeue a task shuts the pool down, and every
//! task dequeued after that is discarded without being processed. Tasks
//! already running are never interrupted.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{debug, error, warn};

use super::engine::SliceProcessor;
use super::progress::ProgressReporter;
use super::result::{OutcomeCollector, TaskOutcome};
use crate::error::{FanoutError, Result};
use crate::partition::Slice;

/// Shared mutable state of one run: the error gate and the task counters
#[derive(Debug)]
pub(crate) struct RunState {
    stop_on_error: bool,
    error_occurred: AtomicBool,
    shut_down: AtomicBool,
    total: AtomicUsize,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    rejected: AtomicUsize,
}

impl RunState {
    pub(crate) fn new(stop_on_error: bool) -> Self {
        Self {
            stop_on_error,
            error_occurred: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            total: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
        }
    }

    pub(crate) fn mark_error(&self) {
        self.error_occurred.store(true, Ordering::Release);
    }

    /// Whether queued work should be abandoned. Read-then-act, so a few
    /// tasks may still start after the first failure.
    pub(crate) fn should_stop(&self) -> bool {
        self.stop_on_error && self.error_occurred.load(Ordering::Acquire)
    }

    pub(crate) fn shutdown_now(&self) -> bool {
        !self.shut_down.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Release);
    }

    pub(crate) fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub(crate) fn record_skipped(&self, count: usize) {
        self.skipped.fetch_add(count, Ordering::AcqRel);
    }

    pub(crate) fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Acquire)
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Acquire)
    }
}

/// One unit of queued work
pub(crate) struct SliceTask<'env, T> {
    pub index: usize,
    pub pages: Slice<'env, T>,
}

/// Sizing of a pool for a single run
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoolSpec<'a> {
    pub label: &'a str,
    pub worker_count: usize,
    pub queue_capacity: usize,
}

pub(crate) struct WorkerPool<'scope, 'env, T> {
    label: String,
    sender: Sender<SliceTask<'env, T>>,
    terminated: Receiver<()>,
    workers: Vec<(String, ScopedJoinHandle<'scope, ()>)>,
    state: &'env RunState,
}

impl<'scope, 'env, T> WorkerPool<'scope, 'env, T>
where
    T: Sync + 'env,
{
    /// Spawn `spec.worker_count` named workers behind a queue holding at most
    /// `spec.queue_capacity` tasks.
    pub(crate) fn start<P>(
        scope: &'scope Scope<'scope, 'env>,
        spec: PoolSpec<'_>,
        state: &'env RunState,
        collector: &'env OutcomeCollector,
        processor: &'env P,
    ) -> Result<Self>
    where
        P: SliceProcessor<T> + ?Sized,
    {
        let (sender, receiver) = channel::bounded::<SliceTask<'env, T>>(spec.queue_capacity);
        let (terminated_tx, terminated_rx) = channel::bounded::<()>(1);

        let mut workers = Vec::with_capacity(spec.worker_count);
        for index in 0..spec.worker_count {
            let name = format!("{}-thread-pool-{}", spec.label, index + 1);
            let tasks = receiver.clone();
            let terminated = terminated_tx.clone();
            let label = spec.label.to_string();

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(scope, move || {
                    run_worker(&label, tasks, state, collector, processor);
                    drop(terminated);
                })
                .map_err(|e| {
                    error!(
                        "❌ POOL: Failed to spawn worker {} for '{}': {}",
                        name, spec.label, e
                    );
                    FanoutError::pool_construction(spec.label, e.to_string())
                })?;

            workers.push((name, handle));
        }

        debug!(
            "🏊 POOL: '{}' started {} workers (queue capacity {})",
            spec.label, spec.worker_count, spec.queue_capacity
        );

        Ok(Self {
            label: spec.label.to_string(),
            sender,
            terminated: terminated_rx,
            workers,
            state,
        })
    }

    /// Submit every slice in order, one task each. Once a failure should stop
    /// the run, the pool is shut down and unsubmitted slices count as skipped.
    pub(crate) fn submit_all(&self, slices: Vec<Slice<'env, T>>) {
        let total = slices.len();

        for (index, pages) in slices.into_iter().enumerate() {
            if self.state.should_stop() && self.state.shutdown_now() {
                warn!(
                    "⏹️ POOL: '{}' stopping submission after task failure",
                    self.label
                );
            }

            if self.state.is_shut_down() {
                let remaining = total - index;
                warn!(
                    "⏹️ POOL: '{}' shut down, {} slices not submitted",
                    self.label, remaining
                );
                self.state.record_skipped(remaining);
                return;
            }

            self.submit(SliceTask { index, pages });
        }
    }

    /// Enqueue a task without blocking. A full or closed queue rejects the
    /// task and records the rejection.
    pub(crate) fn submit(&self, task: SliceTask<'env, T>) {
        match self.sender.try_send(task) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => {
                error!(
                    "❌ POOL: '{}' task queue is full, rejecting slice {}",
                    self.label, task.index
                );
                self.state.record_rejected();
            }
            Err(TrySendError::Disconnected(task)) => {
                error!(
                    "❌ POOL: '{}' has no live workers, rejecting slice {}",
                    self.label, task.index
                );
                self.state.record_rejected();
            }
        }
    }

    /// Stop accepting tasks, then block until every worker has exited,
    /// reporting progress on each interval tick.
    pub(crate) fn await_termination(self, reporter: &ProgressReporter<'_>) -> Result<()> {
        let Self {
            sender,
            terminated,
            workers,
            ..
        } = self;
        drop(sender);

        loop {
            match terminated.recv_timeout(reporter.interval()) {
                Err(RecvTimeoutError::Disconnected) => break,
                Ok(()) | Err(RecvTimeoutError::Timeout) => reporter.report(),
            }
        }

        // Join every worker before reporting, so no panicked thread is left
        // for the scope to re-raise.
        let mut panicked = None;
        for (name, handle) in workers {
            if handle.join().is_err() && panicked.is_none() {
                panicked = Some(name);
            }
        }

        if let Some(worker) = panicked {
            return Err(FanoutError::WorkerPanicked { worker });
        }

        reporter.report_final();
        Ok(())
    }
}

fn run_worker<T, P>(
    label: &str,
    tasks: Receiver<SliceTask<'_, T>>,
    state: &RunState,
    collector: &OutcomeCollector,
    processor: &P,
) where
    P: SliceProcessor<T> + ?Sized,
{
    for task in tasks.iter() {
        if state.is_shut_down() {
            debug!("POOL: '{}' discarding slice {} after shutdown", label, task.index);
            state.record_skipped(1);
            continue;
        }

        if state.should_stop() {
            if state.shutdown_now() {
                warn!(
                    "⏹️ POOL: '{}' stopping after task failure, queued slices will be skipped",
                    label
                );
            }
            state.record_skipped(1);
            continue;
        }

        let outcome = run_task(label, processor, task);
        if !outcome.is_success() {
            state.mark_error();
        }
        collector.record(outcome);
        state.record_completed();
    }
}

fn run_task<T, P>(label: &str, processor: &P, task: SliceTask<'_, T>) -> TaskOutcome
where
    P: SliceProcessor<T> + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(&task.pages)));

    match result {
        Ok(Ok(())) => TaskOutcome::succeeded(task.index),
        Ok(Err(e)) => {
            error!(
                "❌ TASK: '{}' slice {} failed: {:#}",
                label, task.index, e
            );
            TaskOutcome::failed(task.index, e)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                "❌ TASK: '{}' slice {} panicked: {}",
                label, task.index, message
            );
            TaskOutcome::failed(
                task.index,
                anyhow::anyhow!("slice processing panicked: {message}"),
            )
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T> std::fmt::Debug for SliceTask<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceTask")
            .field("index", &self.index)
            .field("pages", &self.pages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reporter(state: &RunState) -> ProgressReporter<'_> {
        ProgressReporter::new("pool-test", state, Duration::from_millis(5))
    }

    #[test]
    fn test_stop_gate_requires_flag_and_error() {
        let lenient = RunState::new(false);
        lenient.mark_error();
        assert!(!lenient.should_stop());

        let strict = RunState::new(true);
        assert!(!strict.should_stop());
        strict.mark_error();
        assert!(strict.should_stop());
    }

    #[test]
    fn test_shutdown_reports_first_caller_only() {
        let state = RunState::new(true);
        assert!(!state.is_shut_down());
        assert!(state.shutdown_now());
        assert!(!state.shutdown_now());
        assert!(state.is_shut_down());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_run_task_captures_errors_and_panics() {
        let data = [1, 2, 3];
        let ok = |_: &[&[i32]]| -> anyhow::Result<()> { Ok(()) };
        let failing = |_: &[&[i32]]| -> anyhow::Result<()> { anyhow::bail!("bad page") };
        let panicking = |_: &[&[i32]]| -> anyhow::Result<()> { panic!("exploded") };

        let task = || SliceTask {
            index: 3,
            pages: vec![&data[..]],
        };

        assert!(run_task("t", &ok, task()).is_success());

        let outcome = run_task("t", &failing, task());
        assert_eq!(outcome.slice_index(), 3);
        assert_eq!(outcome.error().unwrap().to_string(), "bad page");

        let outcome = run_task("t", &panicking, task());
        assert!(outcome
            .error()
            .unwrap()
            .to_string()
            .contains("exploded"));
    }

    #[test]
    fn test_full_queue_rejects_without_blocking() {
        let data: Vec<i32> = (0..6).collect();
        let state = RunState::new(false);
        let collector = OutcomeCollector::default();
        let calls = AtomicUsize::new(0);
        let processor = |_: &[&[i32]]| -> anyhow::Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(())
        };
        let spec = PoolSpec {
            label: "overflow",
            worker_count: 1,
            queue_capacity: 1,
        };

        let drained = thread::scope(|scope| {
            let pool = WorkerPool::start(scope, spec, &state, &collector, &processor)?;
            for (index, page) in data.chunks(1).enumerate() {
                pool.submit(SliceTask {
                    index,
                    pages: vec![page],
                });
            }
            pool.await_termination(&reporter(&state))
        });

        assert!(drained.is_ok());
        let outcomes = collector.into_outcomes();
        // One task may be running and one queued; everything else bounces
        assert!(state.rejected() >= 4);
        assert_eq!(state.rejected() + outcomes.len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), outcomes.len());
        assert!(outcomes.iter().all(TaskOutcome::is_success));
    }

    #[test]
    fn test_pool_without_workers_rejects_as_disconnected() {
        let data = [1, 2];
        let state = RunState::new(false);
        let collector = OutcomeCollector::default();
        let processor = |_: &[&[i32]]| -> anyhow::Result<()> { Ok(()) };
        let spec = PoolSpec {
            label: "no-workers",
            worker_count: 0,
            queue_capacity: 2,
        };

        let drained = thread::scope(|scope| {
            let pool = WorkerPool::start(scope, spec, &state, &collector, &processor)?;
            pool.submit(SliceTask {
                index: 0,
                pages: vec![&data[..]],
            });
            pool.await_termination(&reporter(&state))
        });

        assert!(drained.is_ok());
        assert_eq!(state.rejected(), 1);
        assert!(collector.into_outcomes().is_empty());
    }

    #[test]
    fn test_submit_all_stops_once_failure_is_observed() {
        let data: Vec<i32> = (0..4).collect();
        let state = RunState::new(true);
        state.mark_error();
        let collector = OutcomeCollector::default();
        let calls = AtomicUsize::new(0);
        let processor = |_: &[&[i32]]| -> anyhow::Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        let spec = PoolSpec {
            label: "gated",
            worker_count: 2,
            queue_capacity: 4,
        };

        let drained = thread::scope(|scope| {
            let pool = WorkerPool::start(scope, spec, &state, &collector, &processor)?;
            pool.submit_all(data.chunks(1).map(|page| vec![page]).collect());
            pool.await_termination(&reporter(&state))
        });

        assert!(drained.is_ok());
        assert!(state.is_shut_down());
        assert_eq!(state.skipped(), 4);
        assert_eq!(state.rejected(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(collector.into_outcomes().is_empty());
    }

    #[test]
    fn test_submit_all_without_failure_runs_every_slice() {
        let data: Vec<i32> = (0..5).collect();
        let state = RunState::new(true);
        let collector = OutcomeCollector::default();
        let processor = |_: &[&[i32]]| -> anyhow::Result<()> { Ok(()) };
        let spec = PoolSpec {
            label: "ungated",
            worker_count: 2,
            queue_capacity: 5,
        };

        let drained = thread::scope(|scope| {
            let pool = WorkerPool::start(scope, spec, &state, &collector, &processor)?;
            pool.submit_all(data.chunks(1).map(|page| vec![page]).collect());
            pool.await_termination(&reporter(&state))
        });

        assert!(drained.is_ok());
        assert!(!state.is_shut_down());
        assert_eq!(state.skipped(), 0);
        assert_eq!(state.completed(), 5);

        let mut indices: Vec<usize> = collector
            .into_outcomes()
            .iter()
            .map(TaskOutcome::slice_index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
