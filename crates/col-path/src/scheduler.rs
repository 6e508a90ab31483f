//! Background path search.
//!
//! # Threading model
//!
//! The scheduler owns a rayon `ThreadPool` of `1..=max_threads` workers.
//! Jobs are queued with `spawn_fifo`, so they start in submission order once
//! a worker is free.  The only data crossing threads is the job itself
//! (moved in, immutable) and its outcome (written once into the future's
//! slot).  The simulation thread never blocks on a search: it polls
//! [`PathFuture::is_done`] on later ticks.
//!
//! # Lifecycle
//!
//! The host creates one scheduler, calls [`PathScheduler::start`] once and
//! hands an `Arc` to every navigator.  [`PathScheduler::shutdown`] stops
//! intake and blocks until every queued or running job has finished.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::job::{CancelToken, PathJob};
use crate::point::Path;
use crate::result::{PathResult, PathStatus};
use crate::{PathError, PathingResult};

type Outcome = PathingResult<Option<Path>>;

// ── JobSlot ───────────────────────────────────────────────────────────────────

struct JobSlot {
    cancel:  CancelToken,
    outcome: Mutex<Option<Outcome>>,
    done:    AtomicBool,
    ready:   Condvar,
}

impl JobSlot {
    fn new() -> Self {
        Self {
            cancel:  CancelToken::new(),
            outcome: Mutex::new(None),
            done:    AtomicBool::new(false),
            ready:   Condvar::new(),
        }
    }

    fn finish(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(outcome);
        self.done.store(true, Ordering::Release);
        self.ready.notify_all();
    }
}

// ── PathFuture ────────────────────────────────────────────────────────────────

/// Cancellable handle to a submitted job.
pub struct PathFuture {
    slot:   Arc<JobSlot>,
    result: PathResult,
}

impl PathFuture {
    #[inline]
    pub fn is_done(&self) -> bool {
        self.slot.done.load(Ordering::Acquire)
    }

    /// Request cancellation.  A job that has not started yet will never run
    /// its search; a running one stops at its next expansion.
    pub fn cancel(&self) {
        self.slot.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.slot.cancel.is_cancelled()
    }

    /// Take the outcome once the job is done.  Subsequent calls return `None`.
    pub fn try_take(&self) -> Option<Outcome> {
        if !self.is_done() {
            return None;
        }
        self.slot.outcome.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Block up to `timeout` for completion.  Returns whether the job is done.
    /// Meant for tests and tools; the simulation thread polls instead.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.slot.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        let (_guard, _) = self
            .slot
            .ready
            .wait_timeout_while(guard, timeout, |_| !self.slot.done.load(Ordering::Acquire))
            .unwrap_or_else(PoisonError::into_inner);
        self.is_done()
    }

    pub fn result(&self) -> &PathResult {
        &self.result
    }
}

// ── In-flight counter ─────────────────────────────────────────────────────────

#[derive(Default)]
struct InFlight {
    count:   Mutex<usize>,
    drained: Condvar,
}

impl InFlight {
    /// Count a new job unless intake is closed.  The gate is read under the
    /// counter lock, so `wait_drained` either sees the job or the job sees
    /// the closed gate.
    fn try_enter(&self, accepting: &AtomicBool) -> bool {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if !accepting.load(Ordering::Acquire) {
            return false;
        }
        *count += 1;
        true
    }

    fn leave(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait_drained(&self) {
        let count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        let _count = self
            .drained
            .wait_while(count, |c| *c > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn current(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── PathScheduler ─────────────────────────────────────────────────────────────

pub struct PathScheduler {
    pool:        OnceLock<ThreadPool>,
    accepting:   AtomicBool,
    in_flight:   Arc<InFlight>,
    outstanding: Mutex<Vec<Weak<JobSlot>>>,
}

impl Default for PathScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PathScheduler {
    /// A scheduler that rejects jobs until [`start`](Self::start) is called.
    pub fn new() -> Self {
        Self {
            pool:        OnceLock::new(),
            accepting:   AtomicBool::new(false),
            in_flight:   Arc::new(InFlight::default()),
            outstanding: Mutex::new(Vec::new()),
        }
    }

    /// Create and start in one step.
    pub fn started(max_threads: usize) -> PathingResult<Arc<Self>> {
        let scheduler = Arc::new(Self::new());
        scheduler.start(max_threads)?;
        Ok(scheduler)
    }

    /// Build the worker pool.  Calling again after a successful start is a
    /// no-op; calling after `shutdown` does not reopen intake.
    pub fn start(&self, max_threads: usize) -> PathingResult<()> {
        if self.pool.get().is_some() {
            tracing::debug!("pathfinding scheduler already started");
            return Ok(());
        }
        let threads = max_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("colony-pathfinding-{i}"))
            .build()
            .map_err(|e| PathError::PoolBuild(e.to_string()))?;
        if self.pool.set(pool).is_ok() {
            self.accepting.store(true, Ordering::Release);
            tracing::info!(threads, "pathfinding scheduler started");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Jobs queued or running right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.current()
    }

    /// Queue a job.  Never blocks.
    pub fn enqueue(&self, job: PathJob) -> PathingResult<PathFuture> {
        let pool = self.pool.get().ok_or(PathError::NotStarted)?;
        if !self.in_flight.try_enter(&self.accepting) {
            return Err(PathError::ShutDown);
        }

        let slot = Arc::new(JobSlot::new());
        let future = PathFuture { slot: Arc::clone(&slot), result: job.result() };
        self.track(&slot);

        let in_flight = Arc::clone(&self.in_flight);
        pool.spawn_fifo(move || {
            run_job(&job, &slot);
            in_flight.leave();
        });
        Ok(future)
    }

    /// Stop accepting jobs and wait for everything queued or running.
    pub fn shutdown(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            tracing::info!(in_flight = self.in_flight(), "pathfinding scheduler shutting down");
        }
        self.in_flight.wait_drained();
    }

    /// Like [`shutdown`](Self::shutdown), but cancels outstanding jobs first
    /// so queued ones skip their search and running ones stop early.
    pub fn shutdown_now(&self) {
        self.accepting.store(false, Ordering::Release);
        let slots = std::mem::take(&mut *self.outstanding.lock().unwrap_or_else(PoisonError::into_inner));
        let cancelled = slots
            .iter()
            .filter_map(Weak::upgrade)
            .inspect(|slot| slot.cancel.cancel())
            .count();
        tracing::info!(cancelled, "pathfinding scheduler shutting down now");
        self.in_flight.wait_drained();
    }

    fn track(&self, slot: &Arc<JobSlot>) {
        let mut outstanding = self.outstanding.lock().unwrap_or_else(PoisonError::into_inner);
        outstanding.retain(|w| w.upgrade().is_some_and(|s| !s.done.load(Ordering::Acquire)));
        outstanding.push(Arc::downgrade(slot));
    }
}

fn run_job(job: &PathJob, slot: &JobSlot) {
    let result = job.result();
    if slot.cancel.is_cancelled() {
        result.set_status(PathStatus::Cancelled);
        slot.finish(Err(PathError::Interrupted));
        return;
    }
    result.set_status(PathStatus::Computing);

    let outcome = match catch_unwind(AssertUnwindSafe(|| job.compute(&slot.cancel))) {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(start = %job.start(), "path job panicked");
            Err(PathError::JobPanicked)
        }
    };
    if matches!(outcome, Err(PathError::Interrupted)) {
        result.set_status(PathStatus::Cancelled);
    }
    slot.finish(outcome);
}
