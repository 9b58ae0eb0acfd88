//! # Shared try counting.
//!
//! [`TryCounter`] is the "count then check bound" step every built-in strategy
//! embeds by value. Custom strategies may embed it too.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StrategyError;

/// Monotonic try counter with an upper bound.
///
/// ### Rules
/// - Starts at 0; [`advance`](Self::advance) increments before checking.
/// - Saturates at `u64::MAX`, so an exhausted counter never wraps back into budget.
/// - Never resets.
#[derive(Debug)]
pub struct TryCounter {
    tries: AtomicU64,
    max_tries: u32,
}

impl TryCounter {
    /// Creates a counter allowing `max_tries` successful advances.
    ///
    /// Fails with [`StrategyError::InvalidConfiguration`] if `max_tries < 1`.
    pub fn new(max_tries: u32) -> Result<Self, StrategyError> {
        if max_tries < 1 {
            return Err(StrategyError::invalid("max_tries must be 1 or greater"));
        }
        Ok(Self {
            tries: AtomicU64::new(0),
            max_tries,
        })
    }

    /// Increments the counter and returns the new (1-based) try index.
    ///
    /// Returns [`StrategyError::Exhausted`] if the new value exceeds `max_tries`.
    pub fn advance(&self) -> Result<u64, StrategyError> {
        let prev = self
            .tries
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(1))
            })
            .unwrap_or_else(|n| n);
        let tries = prev.saturating_add(1);
        if tries > u64::from(self.max_tries) {
            return Err(StrategyError::Exhausted {
                max_tries: self.max_tries,
            });
        }
        Ok(tries)
    }

    /// Number of advances so far (saturating).
    pub fn tries(&self) -> u64 {
        self.tries.load(Ordering::Acquire)
    }

    /// The configured bound.
    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// True once a call to [`advance`](Self::advance) has failed.
    pub fn is_exhausted(&self) -> bool {
        self.tries() > u64::from(self.max_tries)
    }
}
