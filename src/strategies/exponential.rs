//! # Growing-delay ("exponential") strategy.
//!
//! [`ExponentialBackoff`] computes the delay for try `i` (1-based) as
//! `i × multiplier × initial_delay`, in milliseconds. Growth is driven by the
//! try index, not by powers of the multiplier; the formula is kept as-is for
//! compatibility with existing configurations.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{ExponentialBackoff, RetryStrategy};
//!
//! let s = ExponentialBackoff::new(Duration::from_millis(100), 2, 3).unwrap();
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(200)); // 1 × 2 × 100
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(400)); // 2 × 2 × 100
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(600)); // 3 × 2 × 100
//! assert!(s.next_delay().is_err());
//! ```

use std::time::Duration;

use crate::error::StrategyError;
use crate::strategies::counter::TryCounter;
use crate::strategies::strategy::{RetryStrategy, to_millis};

/// Retries with a delay that grows with the try index, at most `max_tries` times.
#[derive(Debug)]
pub struct ExponentialBackoff {
    initial_ms: u64,
    multiplier: u32,
    counter: TryCounter,
}

impl ExponentialBackoff {
    /// Creates a new strategy.
    ///
    /// ### Parameters
    /// - `initial_delay`: base delay (truncated to milliseconds)
    /// - `multiplier`: integer factor, must be `>= 1`
    /// - `max_tries`: retry budget, must be `>= 1`
    pub fn new(
        initial_delay: Duration,
        multiplier: u32,
        max_tries: u32,
    ) -> Result<Self, StrategyError> {
        if multiplier < 1 {
            return Err(StrategyError::invalid("multiplier must be 1 or greater"));
        }
        Ok(Self {
            initial_ms: to_millis(initial_delay),
            multiplier,
            counter: TryCounter::new(max_tries)?,
        })
    }

    /// The configured base delay in the canonical unit.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    /// The configured multiplier.
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// The configured try bound.
    pub fn max_tries(&self) -> u32 {
        self.counter.max_tries()
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&self) -> Result<Duration, StrategyError> {
        let try_index = self.counter.advance()?;
        let ms = try_index
            .saturating_mul(u64::from(self.multiplier))
            .saturating_mul(self.initial_ms);
        Ok(Duration::from_millis(ms))
    }

    fn name(&self) -> &str {
        "exponential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_index_times_multiplier_times_initial() {
        let s = ExponentialBackoff::new(Duration::from_millis(50), 3, 5).unwrap();
        for i in 1..=5u64 {
            assert_eq!(
                s.next_delay().unwrap(),
                Duration::from_millis(i * 3 * 50),
                "try {i}"
            );
        }
        assert_eq!(
            s.next_delay(),
            Err(StrategyError::Exhausted { max_tries: 5 })
        );
    }

    #[test]
    fn test_multiplier_one_is_linear() {
        let s = ExponentialBackoff::new(Duration::from_secs(1), 1, 3).unwrap();
        assert_eq!(s.next_delay().unwrap(), Duration::from_secs(1));
        assert_eq!(s.next_delay().unwrap(), Duration::from_secs(2));
        assert_eq!(s.next_delay().unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        assert!(matches!(
            ExponentialBackoff::new(Duration::from_millis(1), 0, 3),
            Err(StrategyError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_zero_max_tries_rejected() {
        assert!(matches!(
            ExponentialBackoff::new(Duration::from_millis(1), 2, 0),
            Err(StrategyError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_huge_values_saturate() {
        let s = ExponentialBackoff::new(Duration::MAX, u32::MAX, 2).unwrap();
        assert_eq!(s.next_delay().unwrap(), Duration::from_millis(u64::MAX));
        assert_eq!(s.next_delay().unwrap(), Duration::from_millis(u64::MAX));
    }
}
