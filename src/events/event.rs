//! # Retry events.
//!
//! A submission is fire-and-forget: the caller never learns whether the task
//! eventually succeeded. [`Event`]s are how that outcome becomes observable.
//!
//! ## Which fields each kind carries
//! ```text
//! kind                 task        strategy  attempt  delay_ms  reason
//! TaskSubmitted        task name   yes/None
//! StrategyUnresolved   task name                                 resolver error
//! TaskStarting         task name             n
//! TaskSucceeded        task name             n
//! TaskFailed           task name             n                  failure
//! RetryScheduled       task name   yes       n        next      failure
//! RetriesExhausted     task name   yes       n                  last failure
//! TaskCancelled        task name             n or None
//! SubscriberOverflow   subscriber                               "full" / "closed"
//! SubscriberPanicked   subscriber                               panic message
//! ```
//! `attempt` is 1-based and counted per submission.
//!
//! `seq` comes from a process-wide counter, so sorting by `seq` restores
//! publication order across receivers.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_task("upload")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(400));
//!
//! assert_eq!(ev.task.as_deref(), Some("upload"));
//! assert_eq!(ev.delay_ms, Some(400));
//! assert!(!ev.is_terminal());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The scheduler accepted a task.
    TaskSubmitted,
    /// A custom strategy could not be built; the task runs once without retries.
    StrategyUnresolved,
    /// An attempt begins.
    TaskStarting,
    /// An attempt returned `Ok`.
    TaskSucceeded,
    /// An attempt returned an error or panicked.
    TaskFailed,
    /// Another attempt was handed to the executor with a delay.
    RetryScheduled,
    /// The strategy refused another attempt.
    RetriesExhausted,
    /// The submission was cancelled before or during an attempt.
    TaskCancelled,
    /// A subscriber queue rejected an event.
    SubscriberOverflow,
    /// A subscriber panicked while handling an event.
    SubscriberPanicked,
}

/// One published event. Unused fields stay `None`.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide publication order.
    pub seq: u64,
    /// Wall-clock creation time.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task name, or subscriber name for subscriber events.
    pub task: Option<Arc<str>>,
    /// Strategy name.
    pub strategy: Option<Arc<str>>,
    /// Attempt number (1-based).
    pub attempt: Option<u32>,
    /// Delay before the next attempt, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Failure message or other detail.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event stamped with the next sequence number and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            strategy: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    #[inline]
    pub fn with_strategy(mut self, strategy: impl Into<Arc<str>>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Stores `d` as whole milliseconds, saturating at `u64::MAX`.
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True if no further event follows for this retried submission.
    ///
    /// A task submitted without a strategy also ends after its single
    /// `TaskFailed`, which this does not report.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskSucceeded | EventKind::RetriesExhausted | EventKind::TaskCancelled
        )
    }
}
