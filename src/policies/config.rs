//! # Static retry configuration attached to a task.
//!
//! [`RetryConfig`] is the declarative description of *which* strategy a task
//! wants. A task exposes it through [`Task::retry_config`](crate::Task::retry_config);
//! the [`StrategyResolver`](crate::StrategyResolver) reads it once per
//! submission and builds a fresh strategy from it.
//!
//! A config has three slots. At most one is expected to be set; if several
//! are, the resolver picks in a fixed order:
//!
//! ```text
//! exponential ──► fixed ──► custom ──► (none)
//! ```
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::RetryConfig;
//!
//! let cfg = RetryConfig::fixed(Duration::from_millis(100), 3);
//! assert!(cfg.fixed.is_some());
//! assert!(!cfg.is_empty());
//! assert!(RetryConfig::none().is_empty());
//! ```

use std::borrow::Cow;
use std::time::Duration;

use crate::error::StrategyError;
use crate::strategies::{ConstantDelay, ExponentialBackoff};

/// Constant delay between retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDelay {
    /// Delay before each retry.
    pub delay: Duration,
    /// Retry budget (`>= 1`).
    pub max_tries: u32,
}

impl FixedDelay {
    /// Builds a fresh [`ConstantDelay`] from this config.
    pub fn build(&self) -> Result<ConstantDelay, StrategyError> {
        ConstantDelay::new(self.delay, self.max_tries)
    }
}

/// Delay growing with the try index (`i × multiplier × initial_delay`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentialDelay {
    /// Base delay.
    pub initial_delay: Duration,
    /// Integer growth factor (`>= 1`).
    pub multiplier: u32,
    /// Retry budget (`>= 1`).
    pub max_tries: u32,
}

impl ExponentialDelay {
    /// Builds a fresh [`ExponentialBackoff`] from this config.
    pub fn build(&self) -> Result<ExponentialBackoff, StrategyError> {
        ExponentialBackoff::new(self.initial_delay, self.multiplier, self.max_tries)
    }
}

/// Reference to a strategy registered by name in the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomStrategy {
    /// Registry name.
    pub name: Cow<'static, str>,
}

impl CustomStrategy {
    /// Refers to the strategy registered under `name`.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }
}

/// Declarative retry configuration of a task type.
///
/// Never mutated by the runtime; a new strategy is built from it on every
/// submission so that retry state is never shared between submissions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetryConfig {
    /// Growing delay (highest priority).
    pub exponential: Option<ExponentialDelay>,
    /// Constant delay.
    pub fixed: Option<FixedDelay>,
    /// Named custom strategy (lowest priority).
    pub custom: Option<CustomStrategy>,
}

impl RetryConfig {
    /// No retry configuration: the task runs exactly once.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a constant-delay slot.
    pub fn fixed(delay: Duration, max_tries: u32) -> Self {
        Self::none().with_fixed(delay, max_tries)
    }

    /// Only a growing-delay slot.
    pub fn exponential(initial_delay: Duration, multiplier: u32, max_tries: u32) -> Self {
        Self::none().with_exponential(initial_delay, multiplier, max_tries)
    }

    /// Only a custom-strategy slot.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::none().with_custom(name)
    }

    /// Returns a config with the constant-delay slot set.
    pub fn with_fixed(mut self, delay: Duration, max_tries: u32) -> Self {
        self.fixed = Some(FixedDelay { delay, max_tries });
        self
    }

    /// Returns a config with the growing-delay slot set.
    pub fn with_exponential(
        mut self,
        initial_delay: Duration,
        multiplier: u32,
        max_tries: u32,
    ) -> Self {
        self.exponential = Some(ExponentialDelay {
            initial_delay,
            multiplier,
            max_tries,
        });
        self
    }

    /// Returns a config with the custom-strategy slot set.
    pub fn with_custom(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.custom = Some(CustomStrategy::named(name));
        self
    }

    /// True if no slot is set.
    pub fn is_empty(&self) -> bool {
        self.exponential.is_none() && self.fixed.is_none() && self.custom.is_none()
    }
}
