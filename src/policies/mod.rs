//! Retry configuration and strategy selection.
//!
//! This module groups the knobs that control **whether** a task is retried and
//! **which** strategy computes its delays.
//!
//! ## Contents
//! - [`RetryConfig`] static config attached to a task (exponential / fixed / custom)
//! - [`StrategyResolver`] turns a config into a fresh strategy per submission
//!
//! ## Defaults
//! - `RetryConfig::none()`: no retry, the task runs exactly once.
//! - `StrategyResolver::new()`: built-in slots only, empty custom registry.

mod config;
mod resolver;

pub use config::{CustomStrategy, ExponentialDelay, FixedDelay, RetryConfig};
pub use resolver::StrategyResolver;
pub(crate) use resolver::panic_message;
