//! # RetryScheduler: submission facade over an external executor.
//!
//! The [`RetryScheduler`] owns the event bus, the strategy resolver and the
//! subscriber listener. Every submission is turned into exactly **one** job
//! handed to the [`Executor`]; later attempts are enqueued by the retry wrapper
//! itself.
//!
//! ## Submission paths
//! ```text
//! submit(task)
//!   ├─ scheduler shut down                 ─► Err(SubmitError::Closed)
//!   └─ resolver.resolve(task.retry_config())
//!        ├─ Ok(Some(strategy))             ─► RetryingTask ─► executor.execute(job)
//!        ├─ Ok(None)                       ─► single run   ─► executor.execute(job)
//!        ├─ Err(Unresolvable)              ─► StrategyUnresolved + single run
//!        └─ Err(InvalidConfiguration, ..)  ─► Err(SubmitError::Strategy(..)), nothing enqueued
//!
//! submit_with(task, strategy)              ─► RetryingTask ─► executor.execute(job)
//!                                             (task.retry_config() is ignored)
//! ```
//!
//! ## Event flow
//! ```text
//! scheduler / wrappers ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                 └──► subscribe() receivers
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   └─► token.cancel()          → every submission token (children) is cancelled
//!   └─► listener drains the bus → SubscriberSet::shutdown() (workers finish queued events)
//! ```
//! Pending delayed jobs are dropped by the executor as soon as their token is
//! cancelled, publishing `TaskCancelled` on the way out. Dropping the last
//! `Arc<RetryScheduler>` cancels the same token, so the listener and the
//! subscriber workers wind down without an explicit `shutdown()`.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        builder::RetrySchedulerBuilder,
        config::Config,
        executor::ExecutorRef,
        handle::RetryHandle,
        runner::run_once,
        wrapper::RetryingTask,
    },
    error::{StrategyError, SubmitError},
    events::{Bus, Event, EventKind},
    policies::StrategyResolver,
    strategies::{RetryStrategy, StrategyRef},
    subscribers::SubscriberSet,
    tasks::TaskRef,
};

/// Retry-on-failure scheduler.
///
/// Created through [`RetryScheduler::builder`]. All methods take `&self`, so
/// the scheduler can be shared behind an [`Arc`] between producers.
pub struct RetryScheduler {
    cfg: Config,
    executor: ExecutorRef,
    resolver: StrategyResolver,
    bus: Bus,
    token: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl RetryScheduler {
    /// Returns a builder for a scheduler with the given configuration.
    pub fn builder(cfg: Config) -> RetrySchedulerBuilder {
        RetrySchedulerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        executor: ExecutorRef,
        resolver: StrategyResolver,
        bus: Bus,
        subs: SubscriberSet,
    ) -> Self {
        let token = CancellationToken::new();
        let listener = if subs.is_empty() {
            None
        } else {
            Some(subscriber_listener(bus.subscribe(), subs, token.clone()))
        };

        Self {
            cfg,
            executor,
            resolver,
            bus,
            token,
            listener: Mutex::new(listener),
        }
    }

    /// Configuration this scheduler was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Submits a task, retrying it according to its own [`RetryConfig`](crate::RetryConfig).
    ///
    /// Returns as soon as the first job is handed to the executor. Task
    /// failures and exhaustion are never reported here; observe them through
    /// [`subscribe`](Self::subscribe) or a subscriber.
    ///
    /// # Errors
    /// - [`SubmitError::Closed`] after [`shutdown`](Self::shutdown).
    /// - [`SubmitError::Strategy`] if a built-in slot of the config is out of
    ///   range. Nothing is enqueued in that case.
    ///
    /// A custom strategy that cannot be resolved is **not** an error: the task
    /// runs once and a [`EventKind::StrategyUnresolved`] event is published.
    pub fn submit(&self, task: TaskRef) -> Result<RetryHandle, SubmitError> {
        self.ensure_open()?;

        match self.resolver.resolve(&task.retry_config()) {
            Ok(Some(strategy)) => Ok(self.enqueue_wrapped(task, strategy)),
            Ok(None) => Ok(self.enqueue_once(task)),
            Err(err @ StrategyError::Unresolvable { .. }) => {
                tracing::warn!(task = task.name(), error = %err, "running task once without retries");
                self.bus.publish(
                    Event::new(EventKind::StrategyUnresolved)
                        .with_task(task.name())
                        .with_reason(err.to_string()),
                );
                Ok(self.enqueue_once(task))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Submits a task retried by an explicit strategy.
    ///
    /// The task's own [`RetryConfig`](crate::RetryConfig) is ignored. The
    /// strategy instance belongs to this submission only.
    ///
    /// # Errors
    /// [`SubmitError::Closed`] after [`shutdown`](Self::shutdown).
    pub fn submit_with<S>(&self, task: TaskRef, strategy: S) -> Result<RetryHandle, SubmitError>
    where
        S: RetryStrategy,
    {
        self.ensure_open()?;
        Ok(self.enqueue_wrapped(task, Box::new(strategy)))
    }

    /// Creates a raw receiver of every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// True after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels every outstanding submission and stops subscriber delivery.
    ///
    /// Attempts that are already running see the cancellation on their token
    /// and are never rescheduled. Waits until subscribers have processed the
    /// events queued before the call. Idempotent.
    pub async fn shutdown(&self) {
        self.token.cancel();

        let listener = self.listener.lock().await.take();
        if let Some(handle) = listener {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "subscriber listener ended abnormally");
            }
        }
    }

    fn ensure_open(&self) -> Result<(), SubmitError> {
        if self.token.is_cancelled() {
            return Err(SubmitError::Closed);
        }
        Ok(())
    }

    fn enqueue_wrapped(&self, task: TaskRef, strategy: StrategyRef) -> RetryHandle {
        let token = self.token.child_token();
        let handle = RetryHandle::new(Arc::from(task.name()), token.clone());

        self.bus.publish(
            Event::new(EventKind::TaskSubmitted)
                .with_task(task.name())
                .with_strategy(strategy.name()),
        );

        let wrapper = RetryingTask::new(
            task,
            strategy,
            Arc::clone(&self.executor),
            token,
            self.bus.clone(),
        );
        self.executor.execute(wrapper.into_job());
        handle
    }

    fn enqueue_once(&self, task: TaskRef) -> RetryHandle {
        let token = self.token.child_token();
        let handle = RetryHandle::new(Arc::from(task.name()), token.clone());

        self.bus
            .publish(Event::new(EventKind::TaskSubmitted).with_task(task.name()));

        let bus = self.bus.clone();
        self.executor.execute(Box::pin(async move {
            if token.is_cancelled() {
                bus.publish(Event::new(EventKind::TaskCancelled).with_task(task.name()));
                return;
            }
            // Outcome is reported through events only.
            let _ = run_once(task.as_ref(), &token, 1, &bus).await;
        }));
        handle
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Forwards bus events to the subscriber set until the scheduler shuts down.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => subs.emit(&ev),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        subs.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::{Executor, Job};
    use crate::error::TaskError;
    use crate::policies::RetryConfig;
    use crate::strategies::ConstantDelay;
    use crate::tasks::TaskFn;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Executor that keeps jobs instead of running them.
    #[derive(Default)]
    struct Parked {
        executed: StdMutex<Vec<Job>>,
    }

    impl Executor for Parked {
        fn execute(&self, job: Job) {
            self.executed.lock().unwrap().push(job);
        }

        fn schedule(&self, _job: Job, _delay: Duration, _cancel: CancellationToken) {}
    }

    fn noop(name: &'static str, retry: RetryConfig) -> TaskRef {
        TaskFn::new(name, |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) })
            .with_retry(retry)
            .into_arc()
    }

    fn scheduler(exec: &Arc<Parked>) -> Arc<RetryScheduler> {
        RetryScheduler::builder(Config::default())
            .with_executor(exec.clone())
            .build()
    }

    #[tokio::test]
    async fn test_each_submit_enqueues_exactly_one_job() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);

        sched.submit(noop("a", RetryConfig::none())).unwrap();
        sched
            .submit(noop("b", RetryConfig::fixed(Duration::from_millis(5), 3)))
            .unwrap();
        sched
            .submit_with(
                noop("c", RetryConfig::none()),
                ConstantDelay::new(Duration::from_millis(5), 2).unwrap(),
            )
            .unwrap();

        assert_eq!(exec.executed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_enqueue() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);

        let err = sched
            .submit(noop("bad", RetryConfig::fixed(Duration::from_millis(5), 0)))
            .unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Strategy(StrategyError::InvalidConfiguration { .. })
        ));
        assert!(exec.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_custom_still_enqueues_once() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);
        let mut rx = sched.subscribe();

        let handle = sched
            .submit(noop("orphan", RetryConfig::custom("missing")))
            .unwrap();

        assert_eq!(handle.name(), "orphan");
        assert_eq!(exec.executed.lock().unwrap().len(), 1);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::StrategyUnresolved);
        let submitted = rx.recv().await.unwrap();
        assert_eq!(submitted.kind, EventKind::TaskSubmitted);
        assert_eq!(submitted.strategy, None);
    }

    #[tokio::test]
    async fn test_submitted_event_names_strategy() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);
        let mut rx = sched.subscribe();

        sched
            .submit(noop(
                "exp",
                RetryConfig::exponential(Duration::from_millis(10), 2, 3),
            ))
            .unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TaskSubmitted);
        assert_eq!(ev.strategy.as_deref(), Some("exponential"));
    }

    #[tokio::test]
    async fn test_closed_after_shutdown() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);

        let handle = sched.submit(noop("a", RetryConfig::none())).unwrap();
        sched.shutdown().await;
        sched.shutdown().await;

        assert!(sched.is_shut_down());
        assert!(handle.is_cancelled());
        assert_eq!(
            sched.submit(noop("b", RetryConfig::none())).unwrap_err(),
            SubmitError::Closed
        );
    }

    #[tokio::test]
    async fn test_drop_cancels_outstanding_submissions() {
        let exec = Arc::new(Parked::default());
        let sched = scheduler(&exec);

        let handle = sched.submit(noop("a", RetryConfig::none())).unwrap();
        drop(sched);

        assert!(handle.is_cancelled());
    }
}
