//! # Scheduler settings.
//!
//! Retry behaviour is not configured here. It comes from each task's
//! [`RetryConfig`](crate::RetryConfig), or from the strategy passed to
//! [`RetryScheduler::submit_with`](crate::RetryScheduler::submit_with).

/// Settings consumed by [`RetryScheduler::builder`](crate::RetryScheduler::builder).
#[derive(Clone, Debug)]
pub struct Config {
    /// Events the bus retains for receivers that have not caught up yet.
    ///
    /// A receiver further behind than this skips the oldest events. `0` is
    /// treated as 1.
    pub bus_capacity: usize,
}

impl Config {
    /// `bus_capacity`, at least 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}
