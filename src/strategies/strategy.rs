//! # Retry strategy capability.
//!
//! A [`RetryStrategy`] decides how long to wait before the next attempt of a
//! failed task and when to stop. One strategy instance is bound to exactly one
//! submission for its whole retry sequence; it is never shared across
//! independent submissions.
//!
//! ## Contract
//! ```text
//! next_delay():
//!   tries += 1
//!   ├─ tries > max_tries ─► Err(StrategyError::Exhausted)   (forever after)
//!   └─ otherwise         ─► Ok(delay)
//! ```

use std::time::Duration;

use crate::error::StrategyError;

/// # Owned handle to a strategy object.
///
/// The wrapper owns its strategy; nothing else holds a reference to it.
pub type StrategyRef = Box<dyn RetryStrategy>;

/// Computes the delay before the next attempt and signals exhaustion.
///
/// Implementations take `&self` and keep their try counter in an atomic
/// (see [`TryCounter`](crate::TryCounter)), so a strategy can be moved between
/// worker threads together with the task it belongs to.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use retryvisor::{RetryStrategy, StrategyError, TryCounter};
///
/// struct EveryTwoSeconds {
///     counter: TryCounter,
/// }
///
/// impl Default for EveryTwoSeconds {
///     fn default() -> Self {
///         Self { counter: TryCounter::new(4).expect("4 >= 1") }
///     }
/// }
///
/// impl RetryStrategy for EveryTwoSeconds {
///     fn next_delay(&self) -> Result<Duration, StrategyError> {
///         self.counter.advance()?;
///         Ok(Duration::from_secs(2))
///     }
/// }
///
/// let s = EveryTwoSeconds::default();
/// assert_eq!(s.next_delay().unwrap(), Duration::from_secs(2));
/// ```
pub trait RetryStrategy: Send + Sync + 'static {
    /// Advances the try counter and returns the delay before the next attempt.
    ///
    /// Returns [`StrategyError::Exhausted`] once the counter has passed the
    /// configured bound; every later call returns it as well.
    fn next_delay(&self) -> Result<Duration, StrategyError>;

    /// Returns a human-readable strategy name for events.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<S: RetryStrategy + ?Sized> RetryStrategy for Box<S> {
    fn next_delay(&self) -> Result<Duration, StrategyError> {
        (**self).next_delay()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Truncates a duration to whole milliseconds, the canonical delay unit.
pub(crate) fn to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
