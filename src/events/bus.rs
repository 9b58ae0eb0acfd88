//! # Broadcast bus for retry events.
//!
//! Every submission path and every in-flight retry attempt
//! publishes through the same [`Bus`]. Attempts run on executor workers, so
//! publishing is a plain `broadcast::Sender::send` and never waits.
//!
//! ```text
//!   RetryScheduler::submit ─┐
//!   attempt on worker A ────┼──► Bus ──┬──► listener ──► SubscriberSet
//!   attempt on worker B ────┘          └──► RetryScheduler::subscribe()
//! ```
//!
//! Delivery is best effort: an event sent while nobody listens is gone, and a
//! receiver that falls more than `capacity` events behind gets
//! `RecvError::Lagged(skipped)` and resumes from the oldest retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publisher/subscriber endpoint over one broadcast channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining at most `capacity` undelivered events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every current receiver. Dropped if there are none.
    pub fn publish(&self, ev: Event) {
        // Err only means "no receivers".
        let _ = self.tx.send(ev);
    }

    /// New receiver; sees only events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
