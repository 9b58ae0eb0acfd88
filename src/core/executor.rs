//! # External scheduler boundary.
//!
//! The retry layer does not own threads. It hands [`Job`]s to an
//! [`Executor`], which must offer two non-blocking operations:
//!
//! ```text
//! execute(job)                  run this job now, on some worker
//! schedule(job, delay, cancel)  run this job once `delay` has elapsed,
//!                               or drop it as soon as `cancel` fires
//! ```
//!
//! [`TokioExecutor`] implements both on top of a Tokio runtime handle.
//! Any other pool can be plugged in by implementing the trait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// A unit of work handed to an [`Executor`].
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared handle to an executor.
pub type ExecutorRef = Arc<dyn Executor>;

/// Execution facility that runs jobs now or after a delay.
///
/// ### Rules
/// - Both methods return immediately; they never run the job inline.
/// - A job passed to [`schedule`](Executor::schedule) must not start before `delay` elapses.
/// - A scheduled job should be dropped once its `cancel` token fires; holding it
///   until the delay ends keeps the task and its strategy alive that long.
/// - An executor may drop jobs it can no longer run (e.g. after its own shutdown).
pub trait Executor: Send + Sync + 'static {
    /// Runs `job` as soon as possible.
    fn execute(&self, job: Job);

    /// Runs `job` after `delay`, unless `cancel` fires first.
    fn schedule(&self, job: Job, delay: Duration, cancel: CancellationToken);
}

/// [`Executor`] backed by a Tokio runtime.
///
/// Delayed jobs are spawned immediately and sleep inside the runtime, so the
/// caller is never blocked. A waiting job is dropped when its own cancel token
/// fires or when [`TokioExecutor::shutdown`] is called.
#[derive(Clone)]
pub struct TokioExecutor {
    handle: Handle,
    token: CancellationToken,
}

impl fmt::Debug for TokioExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioExecutor")
            .field("shut_down", &self.token.is_cancelled())
            .finish()
    }
}

impl TokioExecutor {
    /// Creates an executor spawning onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            token: CancellationToken::new(),
        }
    }

    /// Creates an executor for the current runtime.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime (see [`Handle::current`]).
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Drops all pending delayed jobs and refuses new ones.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// True after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) {
        if self.token.is_cancelled() {
            return;
        }
        self.handle.spawn(job);
    }

    fn schedule(&self, job: Job, delay: Duration, cancel: CancellationToken) {
        if self.token.is_cancelled() || cancel.is_cancelled() {
            return;
        }
        if delay.is_zero() {
            self.handle.spawn(job);
            return;
        }

        let token = self.token.clone();
        self.handle.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => job.await,
                _ = token.cancelled() => {}
                _ = cancel.cancelled() => {}
            }
        });
    }
}
