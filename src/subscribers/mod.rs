//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the scheduler to deliver [`Event`](crate::Event)s.
//!
//! ## Architecture
//! ```text
//! RetryingTask ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                           ├──► LogWriter (feature "logging")
//!                                                           ├──► Metrics
//!                                                           └──► Custom ...
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
