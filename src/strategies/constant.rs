//! # Constant-delay strategy.
//!
//! [`ConstantDelay`] waits the same delay before every retry until the try
//! budget is spent.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{ConstantDelay, RetryStrategy};
//!
//! let s = ConstantDelay::new(Duration::from_millis(250), 2).unwrap();
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(250));
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(250));
//! assert!(s.next_delay().is_err());
//! ```

use std::time::Duration;

use crate::error::StrategyError;
use crate::strategies::counter::TryCounter;
use crate::strategies::strategy::{RetryStrategy, to_millis};

/// Retries with a fixed delay, at most `max_tries` times.
#[derive(Debug)]
pub struct ConstantDelay {
    delay_ms: u64,
    counter: TryCounter,
}

impl ConstantDelay {
    /// Creates a strategy returning `delay` (truncated to milliseconds).
    ///
    /// Fails with [`StrategyError::InvalidConfiguration`] if `max_tries < 1`.
    pub fn new(delay: Duration, max_tries: u32) -> Result<Self, StrategyError> {
        Ok(Self {
            delay_ms: to_millis(delay),
            counter: TryCounter::new(max_tries)?,
        })
    }

    /// The configured delay in the canonical unit.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The configured try bound.
    pub fn max_tries(&self) -> u32 {
        self.counter.max_tries()
    }
}

impl RetryStrategy for ConstantDelay {
    fn next_delay(&self) -> Result<Duration, StrategyError> {
        self.counter.advance()?;
        Ok(Duration::from_millis(self.delay_ms))
    }

    fn name(&self) -> &str {
        "constant"
    }
}
