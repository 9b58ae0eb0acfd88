//! # RetryingTask: retry-aware wrapper around one submitted task.
//!
//! Binds exactly one ([`TaskRef`], [`StrategyRef`]) pair. The wrapper is
//! itself the job handed to the executor; on failure it moves itself into a
//! new delayed job, so the strategy's try counter carries over to the next
//! attempt.
//!
//! ## State machine
//! ```text
//!             ┌──────────────────────────────────────────────┐
//!             ▼                                              │
//!          Pending ──(token cancelled)──► Cancelled          │
//!             │                                              │
//!             ▼                                              │
//!          Running ─┬─ Ok(())              ─► Succeeded       │
//!                   └─ Err(_) / panic                         │
//!                        ├─ token cancelled ─► Cancelled      │
//!                        └─ strategy.next_delay()             │
//!                             ├─ Ok(delay) ─► Rescheduled ───┘  executor.schedule(self, delay, token)
//!                             └─ Err(_)    ─► Exhausted
//! ```
//!
//! `Err(Canceled)` from a task whose token was never cancelled is an ordinary
//! failure.
//!
//! ## Rules
//! - Attempts run **sequentially**: the next job is scheduled only after the
//!   current attempt has fully returned.
//! - Delays are never slept here; they are handed to the executor.
//! - Failures and exhaustion are **not** surfaced to the submitter; they are
//!   only published as events.
//! - `Succeeded`, `Exhausted` and `Cancelled` are terminal; the wrapper is dropped.
//! - A `Pending` wrapper dropped by the executor after cancellation still
//!   publishes `TaskCancelled`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    core::executor::{ExecutorRef, Job},
    core::runner::run_once,
    error::TaskError,
    events::{Bus, Event, EventKind},
    strategies::StrategyRef,
    tasks::TaskRef,
};

/// Lifecycle state of a [`RetryingTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WrapperState {
    /// Waiting to be run by the executor.
    Pending,
    /// An attempt is executing.
    Running,
    /// The task completed normally.
    Succeeded,
    /// The task failed and the next attempt is due after the delay.
    Rescheduled(Duration),
    /// The strategy refused another attempt.
    Exhausted,
    /// The submission was cancelled.
    Cancelled,
}

impl WrapperState {
    /// True for states after which the wrapper is discarded.
    pub(crate) fn is_terminal(self) -> bool {
        matches!(
            self,
            WrapperState::Succeeded | WrapperState::Exhausted | WrapperState::Cancelled
        )
    }
}

/// Retry wrapper around one submitted task.
pub(crate) struct RetryingTask {
    task: TaskRef,
    strategy: StrategyRef,
    executor: ExecutorRef,
    token: CancellationToken,
    bus: Bus,
    attempts: u32,
    state: WrapperState,
}

impl RetryingTask {
    /// Creates a wrapper in the `Pending` state.
    pub(crate) fn new(
        task: TaskRef,
        strategy: StrategyRef,
        executor: ExecutorRef,
        token: CancellationToken,
        bus: Bus,
    ) -> Self {
        Self {
            task,
            strategy,
            executor,
            token,
            bus,
            attempts: 0,
            state: WrapperState::Pending,
        }
    }

    /// Converts the wrapper into a job for the executor.
    pub(crate) fn into_job(self) -> Job {
        Box::pin(self.drive())
    }

    /// Runs one attempt and, if the strategy allows, schedules the next one.
    async fn drive(mut self) {
        match self.step().await {
            WrapperState::Rescheduled(delay) => {
                self.state = WrapperState::Pending;
                let executor = Arc::clone(&self.executor);
                let cancel = self.token.clone();
                executor.schedule(self.into_job(), delay, cancel);
            }
            state => debug_assert!(state.is_terminal(), "non-terminal state {state:?}"),
        }
    }

    /// Performs one `Pending → …` transition without touching the executor.
    pub(crate) async fn step(&mut self) -> WrapperState {
        debug_assert_eq!(self.state, WrapperState::Pending);

        if self.token.is_cancelled() {
            self.publish_cancelled();
            return self.settle(WrapperState::Cancelled);
        }

        self.state = WrapperState::Running;
        self.attempts = self.attempts.saturating_add(1);

        let err = match run_once(self.task.as_ref(), &self.token, self.attempts, &self.bus).await {
            Ok(()) => return self.settle(WrapperState::Succeeded),
            Err(TaskError::Canceled) if self.token.is_cancelled() => {
                return self.settle(WrapperState::Cancelled);
            }
            Err(e) => e,
        };

        if self.token.is_cancelled() {
            self.publish_cancelled();
            return self.settle(WrapperState::Cancelled);
        }

        match self.strategy.next_delay() {
            Ok(delay) => {
                self.bus.publish(
                    Event::new(EventKind::RetryScheduled)
                        .with_task(self.task.name())
                        .with_strategy(self.strategy.name())
                        .with_attempt(self.attempts)
                        .with_delay(delay)
                        .with_reason(err.to_string()),
                );
                self.settle(WrapperState::Rescheduled(delay))
            }
            Err(_) => {
                self.bus.publish(
                    Event::new(EventKind::RetriesExhausted)
                        .with_task(self.task.name())
                        .with_strategy(self.strategy.name())
                        .with_attempt(self.attempts)
                        .with_reason(err.to_string()),
                );
                self.settle(WrapperState::Exhausted)
            }
        }
    }

    fn settle(&mut self, state: WrapperState) -> WrapperState {
        self.state = state;
        state
    }

    fn publish_cancelled(&self) {
        let mut ev = Event::new(EventKind::TaskCancelled).with_task(self.task.name());
        if self.attempts > 0 {
            ev = ev.with_attempt(self.attempts);
        }
        self.bus.publish(ev);
    }
}

impl Drop for RetryingTask {
    fn drop(&mut self) {
        // Executor dropped the job while it waited out a cancelled delay.
        if self.state == WrapperState::Pending && self.token.is_cancelled() {
            self.publish_cancelled();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::Executor;
    use crate::strategies::{ConstantDelay, ExponentialBackoff};
    use crate::tasks::TaskFn;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Executor that only records what it was asked to do.
    #[derive(Default)]
    struct Recording {
        scheduled: Mutex<Vec<Duration>>,
    }

    impl Executor for Recording {
        fn execute(&self, _job: Job) {}

        fn schedule(&self, _job: Job, delay: Duration, _cancel: CancellationToken) {
            self.scheduled.lock().unwrap().push(delay);
        }
    }

    /// Task failing its first `failures` runs, then succeeding.
    fn flaky(failures: u32, runs: &Arc<AtomicU32>) -> TaskRef {
        let runs = Arc::clone(runs);
        TaskFn::arc("flaky", move |_ctx: CancellationToken| {
            let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= failures {
                    Err(TaskError::fail(format!("boom #{n}")))
                } else {
                    Ok(())
                }
            }
        })
    }

    fn wrapper(task: TaskRef, strategy: StrategyRef) -> (RetryingTask, Arc<Recording>) {
        let exec = Arc::new(Recording::default());
        let w = RetryingTask::new(
            task,
            strategy,
            exec.clone(),
            CancellationToken::new(),
            Bus::new(64),
        );
        (w, exec)
    }

    #[tokio::test]
    async fn test_success_is_terminal() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(10), 3).unwrap());
        let (mut w, _) = wrapper(flaky(0, &runs), strategy);

        assert_eq!(w.step().await, WrapperState::Succeeded);
        assert!(w.state.is_terminal());
        assert_eq!(w.attempts, 1);
    }

    #[tokio::test]
    async fn test_failure_reschedules_with_strategy_delays() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ExponentialBackoff::new(Duration::from_millis(100), 2, 2).unwrap());
        let (mut w, _) = wrapper(flaky(u32::MAX, &runs), strategy);

        assert_eq!(
            w.step().await,
            WrapperState::Rescheduled(Duration::from_millis(200))
        );
        w.state = WrapperState::Pending;
        assert_eq!(
            w.step().await,
            WrapperState::Rescheduled(Duration::from_millis(400))
        );
        w.state = WrapperState::Pending;
        assert_eq!(w.step().await, WrapperState::Exhausted);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_drive_hands_itself_to_executor() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(100), 3).unwrap());
        let (w, exec) = wrapper(flaky(1, &runs), strategy);

        w.into_job().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(
            *exec.scheduled.lock().unwrap(),
            vec![Duration::from_millis(100)]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_schedules_nothing() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(100), 1).unwrap());
        let (mut w, exec) = wrapper(flaky(u32::MAX, &runs), strategy);

        assert!(matches!(w.step().await, WrapperState::Rescheduled(_)));
        w.state = WrapperState::Pending;
        w.into_job().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(exec.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_runs() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(1), 3).unwrap());
        let (mut w, _) = wrapper(flaky(0, &runs), strategy);
        w.token.cancel();

        assert_eq!(w.step().await, WrapperState::Cancelled);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(w.attempts, 0);
    }

    #[tokio::test]
    async fn test_cancel_during_attempt_prevents_reschedule() {
        let token = CancellationToken::new();
        let t = token.clone();
        let task: TaskRef = TaskFn::arc("self-cancel", move |_ctx: CancellationToken| {
            let t = t.clone();
            async move {
                t.cancel();
                Err::<(), _>(TaskError::fail("late"))
            }
        });
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(1), 3).unwrap());
        let exec = Arc::new(Recording::default());
        let w = RetryingTask::new(task, strategy, exec.clone(), token, Bus::new(8));

        w.into_job().await;
        assert!(exec.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_canceled_error_without_cancellation_is_retried() {
        let task: TaskRef = TaskFn::arc("spurious", |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::Canceled)
        });
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(10), 3).unwrap());
        let (mut w, _) = wrapper(task, strategy);

        assert_eq!(
            w.step().await,
            WrapperState::Rescheduled(Duration::from_millis(10))
        );
    }

    #[tokio::test]
    async fn test_canceled_error_after_cancellation_is_terminal() {
        let token = CancellationToken::new();
        let t = token.clone();
        let task: TaskRef = TaskFn::arc("observer", move |_ctx: CancellationToken| {
            let t = t.clone();
            async move {
                t.cancel();
                Err::<(), _>(TaskError::Canceled)
            }
        });
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(10), 3).unwrap());
        let exec = Arc::new(Recording::default());
        let mut w = RetryingTask::new(task, strategy, exec.clone(), token, Bus::new(8));

        assert_eq!(w.step().await, WrapperState::Cancelled);
        assert!(exec.scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_cancelled_pending_wrapper_publishes_cancel() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_secs(3600), 3).unwrap());
        let (mut w, _) = wrapper(flaky(u32::MAX, &runs), strategy);
        let mut rx = w.bus.subscribe();

        assert!(matches!(w.step().await, WrapperState::Rescheduled(_)));
        w.state = WrapperState::Pending;
        w.token.cancel();
        drop(w);

        let last = std::iter::from_fn(|| rx.try_recv().ok()).last().unwrap();
        assert_eq!(last.kind, EventKind::TaskCancelled);
        assert_eq!(last.attempt, Some(1));
    }

    #[tokio::test]
    async fn test_events_for_failed_then_rescheduled_attempt() {
        let runs = Arc::new(AtomicU32::new(0));
        let strategy = Box::new(ConstantDelay::new(Duration::from_millis(100), 3).unwrap());
        let (mut w, _) = wrapper(flaky(1, &runs), strategy);
        let mut rx = w.bus.subscribe();

        w.step().await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::RetryScheduled
            ]
        );
    }
}
