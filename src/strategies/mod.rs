//! Retry strategies.
//!
//! ## Contents
//! - [`RetryStrategy`] the capability every strategy implements
//! - [`TryCounter`]    shared "count then check bound" helper
//! - [`ConstantDelay`] same delay before every retry
//! - [`ExponentialBackoff`] delay grows with the try index
//!
//! ## Quick wiring
//! ```text
//! RetryConfig ──► StrategyResolver ──► StrategyRef ──► RetryingTask
//!                                                        └─► next_delay() after each failure
//! ```

mod constant;
mod counter;
mod exponential;
mod strategy;

pub use constant::ConstantDelay;
pub use counter::TryCounter;
pub use exponential::ExponentialBackoff;
pub use strategy::{RetryStrategy, StrategyRef};
