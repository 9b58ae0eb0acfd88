//! # Logging subscriber.
//!
//! [`LogWriter`] forwards events to [`tracing`] in a compact key=value form.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Levels
//! ```text
//! debug  TaskSubmitted, TaskStarting, TaskSucceeded
//! info   RetryScheduled, TaskCancelled
//! warn   TaskFailed, RetriesExhausted, StrategyUnresolved, SubscriberOverflow
//! error  SubscriberPanicked
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// `tracing`-backed logging subscriber.
///
/// Enabled via the `logging` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::TaskSubmitted => {
                let strategy = e.strategy.as_deref().unwrap_or("none");
                tracing::debug!(task, strategy, seq = e.seq, "[submitted]");
            }
            EventKind::TaskStarting => {
                tracing::debug!(task, attempt = e.attempt, seq = e.seq, "[starting]");
            }
            EventKind::TaskSucceeded => {
                tracing::debug!(task, attempt = e.attempt, seq = e.seq, "[succeeded]");
            }
            EventKind::TaskFailed => {
                tracing::warn!(task, attempt = e.attempt, err = reason, seq = e.seq, "[failed]");
            }
            EventKind::RetryScheduled => {
                tracing::info!(
                    task,
                    after_attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    seq = e.seq,
                    "[retry]"
                );
            }
            EventKind::RetriesExhausted => {
                tracing::warn!(task, attempts = e.attempt, err = reason, seq = e.seq, "[exhausted]");
            }
            EventKind::TaskCancelled => {
                tracing::info!(task, attempt = e.attempt, seq = e.seq, "[cancelled]");
            }
            EventKind::StrategyUnresolved => {
                tracing::warn!(task, err = reason, seq = e.seq, "[strategy-unresolved]");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = task, reason, seq = e.seq, "[subscriber-overflow]");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = task, reason, seq = e.seq, "[subscriber-panicked]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
