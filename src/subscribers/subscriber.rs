//! # Subscriber trait.
//!
//! Failed attempts and exhausted retries never reach the submitter, so a
//! [`Subscribe`] implementation is the place to log, count or alert on them.
//! The scheduler runs each subscriber on its own worker behind a bounded
//! queue (see [`SubscriberSet`](crate::SubscriberSet)).
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use retryvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct ExhaustionCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for ExhaustionCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RetriesExhausted {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "exhaustion-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of retry events.
///
/// `on_event` runs on the subscriber's own worker, one event at a time, in
/// publication order. Slow handlers fill only their own queue; a panic is
/// caught and reported as `SubscriberPanicked`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic reports. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue size for this subscriber (minimum 1). Events arriving while the
    /// queue is full are dropped for this subscriber only.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
