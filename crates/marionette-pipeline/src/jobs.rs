//! Dependency-chained job scheduling.
//!
//! A [`JobHandle`] is an opaque token for "work that must finish before
//! dependent work starts".  Job-mode retargeting processors receive the
//! previous handle of the frame, schedule their work after it through a
//! [`JobScheduler`], and return the new handle.  The pipeline threads the
//! handles into a single linear chain; whoever drives the pipeline waits on
//! the final handle before reading the bones again.
//!
//! Two schedulers are provided:
//!
//! | Scheduler               | Runs jobs on                                   |
//! |-------------------------|------------------------------------------------|
//! | [`ImmediateScheduler`]  | the calling thread, before `schedule` returns  |
//! | [`WorkerPoolScheduler`] | the Tokio blocking pool, after the dependency  |
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use marionette_pipeline::jobs::{ImmediateScheduler, JobHandle, JobScheduler};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let scheduler = ImmediateScheduler;
//!
//! let l = Arc::clone(&log);
//! let first = scheduler.schedule(&JobHandle::completed(), Box::new(move || l.lock().unwrap().push(1)));
//! let l = Arc::clone(&log);
//! let second = scheduler.schedule(&first, Box::new(move || l.lock().unwrap().push(2)));
//!
//! second.wait();
//! assert_eq!(*log.lock().unwrap(), vec![1, 2]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use tracing::warn;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

// ────────────────────────────────────────────────────────────────────────────
// JobHandle
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Completion {
    done: Mutex<bool>,
    signal: Condvar,
}

/// Dependency token for a scheduled job.
///
/// Clones observe the same completion.  [`JobHandle::completed`] is the
/// already-satisfied handle used to start a chain.
#[derive(Clone)]
pub struct JobHandle {
    id: u64,
    completion: Option<Arc<Completion>>,
}

impl JobHandle {
    /// A handle with nothing to wait for.  Its id is `0`.
    pub fn completed() -> Self {
        Self {
            id: 0,
            completion: None,
        }
    }

    /// Create a fresh pending handle and the [`JobCompleter`] that resolves
    /// it.  Intended for [`JobScheduler`] implementations.
    pub fn pending() -> (Self, JobCompleter) {
        let completion = Arc::new(Completion::default());
        let handle = Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            completion: Some(Arc::clone(&completion)),
        };
        (handle, JobCompleter { completion })
    }

    /// Unique id of the job behind this handle (diagnostics only).
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        match &self.completion {
            None => true,
            Some(c) => *c.done.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Block the current thread until the job has finished.
    pub fn wait(&self) {
        let Some(c) = &self.completion else {
            return;
        };
        let mut done = c.done.lock().unwrap_or_else(PoisonError::into_inner);
        while !*done {
            done = c.signal.wait(done).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Resolves the [`JobHandle`] it was created with when dropped.
///
/// Completion happens on drop so that a job which panics still releases the
/// jobs waiting on it.
pub struct JobCompleter {
    completion: Arc<Completion>,
}

impl JobCompleter {
    /// Mark the job as finished.
    pub fn complete(self) {}
}

impl Drop for JobCompleter {
    fn drop(&mut self) {
        let mut done = self
            .completion
            .done
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *done = true;
        self.completion.signal.notify_all();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JobScheduler
// ────────────────────────────────────────────────────────────────────────────

/// Accepts jobs that must start only after `after` has completed.
///
/// Implementations must never run `job` before `after` is complete, and the
/// returned handle must not complete before `job` has returned.
pub trait JobScheduler: Send + Sync {
    fn schedule(&self, after: &JobHandle, job: Job) -> JobHandle;
}

/// Runs every job synchronously on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl JobScheduler for ImmediateScheduler {
    fn schedule(&self, after: &JobHandle, job: Job) -> JobHandle {
        after.wait();
        let (handle, completer) = JobHandle::pending();
        job();
        completer.complete();
        handle
    }
}

/// Runs jobs on the Tokio blocking thread pool.
///
/// Each job occupies a blocking-pool thread while it waits for its
/// dependency.  Dependencies always point at previously scheduled jobs, so
/// a chain can never wait on itself.
///
/// A job handed to a runtime that is shutting down is discarded without
/// running.  Its handle still completes, so waiters never hang, and a
/// warning is logged with the job id.
#[derive(Debug, Clone)]
pub struct WorkerPoolScheduler {
    runtime: tokio::runtime::Handle,
}

impl WorkerPoolScheduler {
    /// Schedule onto the runtime behind `runtime`.
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Schedule onto the runtime of the calling context, if there is one.
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl JobScheduler for WorkerPoolScheduler {
    fn schedule(&self, after: &JobHandle, job: Job) -> JobHandle {
        let (handle, completer) = JobHandle::pending();
        let after = after.clone();
        let mut pending = PendingJob {
            id: handle.id(),
            started: false,
            _completer: completer,
        };
        // The JoinHandle is not needed: completion is reported through the
        // JobHandle chain when `pending` drops, whether the job ran, panicked
        // or was discarded.
        let _ = self.runtime.spawn_blocking(move || {
            pending.started = true;
            after.wait();
            job();
            drop(pending);
        });
        handle
    }
}

/// Owns a worker-pool job's completer and warns if the job is dropped
/// before it starts.
struct PendingJob {
    id: u64,
    started: bool,
    _completer: JobCompleter,
}

impl Drop for PendingJob {
    fn drop(&mut self) {
        if !self.started {
            warn!(job = self.id, "job discarded before running; runtime shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn completed_handle_never_blocks() {
        let h = JobHandle::completed();
        assert!(h.is_complete());
        assert_eq!(h.id(), 0);
        h.wait();
    }

    #[test]
    fn pending_handle_completes_on_completer_drop() {
        let (h, completer) = JobHandle::pending();
        assert!(!h.is_complete());
        assert_ne!(h.id(), 0);
        drop(completer);
        assert!(h.is_complete());
    }

    #[test]
    fn pending_handles_have_unique_ids() {
        let (a, _ca) = JobHandle::pending();
        let (b, _cb) = JobHandle::pending();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn wait_unblocks_from_other_thread() {
        let (h, completer) = JobHandle::pending();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            completer.complete();
        });
        h.wait();
        assert!(h.is_complete());
        t.join().unwrap();
    }

    #[test]
    fn immediate_scheduler_runs_inline() {
        let ran = Arc::new(Mutex::new(false));
        let r = Arc::clone(&ran);
        let h = ImmediateScheduler.schedule(&JobHandle::completed(), Box::new(move || *r.lock().unwrap() = true));
        assert!(h.is_complete());
        assert!(*ran.lock().unwrap());
    }

    #[test]
    fn worker_pool_respects_chain_order() {
        let rt = runtime();
        let scheduler = WorkerPoolScheduler::new(rt.handle().clone());
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut chain = JobHandle::completed();
        for i in 0..4u32 {
            let l = Arc::clone(&log);
            chain = scheduler.schedule(
                &chain,
                Box::new(move || {
                    // Earlier jobs are slower; only the dependency keeps order.
                    std::thread::sleep(Duration::from_millis(u64::from(20 - i * 5)));
                    l.lock().unwrap().push(i);
                }),
            );
        }

        chain.wait();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn worker_pool_releases_dependents_of_panicking_job() {
        let rt = runtime();
        let scheduler = WorkerPoolScheduler::new(rt.handle().clone());

        let failing = scheduler.schedule(&JobHandle::completed(), Box::new(|| panic!("job failed")));
        let ran = Arc::new(Mutex::new(false));
        let r = Arc::clone(&ran);
        let next = scheduler.schedule(&failing, Box::new(move || *r.lock().unwrap() = true));

        next.wait();
        assert!(failing.is_complete());
        assert!(*ran.lock().unwrap());
    }

    #[test]
    fn worker_pool_after_shutdown_completes_without_running() {
        let rt = runtime();
        let scheduler = WorkerPoolScheduler::new(rt.handle().clone());
        rt.shutdown_background();

        let ran = Arc::new(Mutex::new(false));
        let r = Arc::clone(&ran);
        let h = scheduler.schedule(&JobHandle::completed(), Box::new(move || *r.lock().unwrap() = true));

        h.wait();
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn try_current_outside_runtime_is_none() {
        assert!(WorkerPoolScheduler::try_current().is_none());
    }

    #[test]
    fn try_current_inside_runtime_is_some() {
        let rt = runtime();
        let found = rt.block_on(async { WorkerPoolScheduler::try_current().is_some() });
        assert!(found);
    }
}
