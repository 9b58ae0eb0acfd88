//! # Strategy resolution from static configuration.
//!
//! [`StrategyResolver`] turns a task's [`RetryConfig`] into a fresh
//! [`StrategyRef`]. Built-in slots are constructed directly; custom slots are
//! looked up by name in a registry of factories.
//!
//! ## Resolution order
//! ```text
//! resolve(cfg)
//!   ├─ cfg.exponential? ─► ExponentialBackoff::new(..)   (InvalidConfiguration on bad params)
//!   ├─ cfg.fixed?       ─► ConstantDelay::new(..)        (InvalidConfiguration on bad params)
//!   ├─ cfg.custom?      ─► registry[name]()              (Unresolvable on miss/error/panic)
//!   └─ otherwise        ─► Ok(None)
//! ```
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{ConstantDelay, RetryConfig, StrategyResolver};
//!
//! let mut resolver = StrategyResolver::new();
//! resolver.register_fn("quick", || ConstantDelay::new(Duration::from_millis(10), 2));
//!
//! let s = resolver.resolve(&RetryConfig::custom("quick")).unwrap().unwrap();
//! assert_eq!(s.next_delay().unwrap(), Duration::from_millis(10));
//!
//! assert!(resolver.resolve(&RetryConfig::none()).unwrap().is_none());
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::StrategyError;
use crate::policies::config::{CustomStrategy, RetryConfig};
use crate::strategies::{RetryStrategy, StrategyRef};

/// Factory building a fresh strategy instance.
type StrategyFactory = Arc<dyn Fn() -> Result<StrategyRef, StrategyError> + Send + Sync>;

/// Registry-backed resolver from [`RetryConfig`] to strategies.
#[derive(Clone, Default)]
pub struct StrategyResolver {
    factories: HashMap<Cow<'static, str>, StrategyFactory>,
}

impl fmt::Debug for StrategyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        f.debug_struct("StrategyResolver")
            .field("custom", &names)
            .finish()
    }
}

impl StrategyResolver {
    /// Creates a resolver with an empty custom registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy type built with its no-argument constructor (`Default`).
    ///
    /// Re-registering a name replaces the previous factory.
    pub fn register<S>(&mut self, name: impl Into<Cow<'static, str>>) -> &mut Self
    where
        S: RetryStrategy + Default,
    {
        self.register_fn(name, || Ok(S::default()))
    }

    /// Registers a fallible factory under `name`.
    ///
    /// A factory error (or panic) makes resolution of that name fail with
    /// [`StrategyError::Unresolvable`].
    pub fn register_fn<S, F>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        S: RetryStrategy,
        F: Fn() -> Result<S, StrategyError> + Send + Sync + 'static,
    {
        let factory: StrategyFactory = Arc::new(move || f().map(|s| Box::new(s) as StrategyRef));
        self.factories.insert(name.into(), factory);
        self
    }

    /// True if a custom strategy is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds the strategy selected by `cfg`, if any.
    ///
    /// ### Errors
    /// - [`StrategyError::InvalidConfiguration`] for out-of-range built-in parameters.
    /// - [`StrategyError::Unresolvable`] if the custom slot cannot be built.
    pub fn resolve(&self, cfg: &RetryConfig) -> Result<Option<StrategyRef>, StrategyError> {
        if let Some(exp) = &cfg.exponential {
            return Ok(Some(Box::new(exp.build()?)));
        }
        if let Some(fixed) = &cfg.fixed {
            return Ok(Some(Box::new(fixed.build()?)));
        }
        if let Some(custom) = &cfg.custom {
            return self.build_custom(custom).map(Some);
        }
        Ok(None)
    }

    fn build_custom(&self, custom: &CustomStrategy) -> Result<StrategyRef, StrategyError> {
        let unresolvable = |reason: String| StrategyError::Unresolvable {
            name: custom.name.clone(),
            reason,
        };

        let factory = self
            .factories
            .get(custom.name.as_ref())
            .ok_or_else(|| unresolvable("no strategy registered under this name".to_string()))?;

        match catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(strategy)) => Ok(strategy),
            Ok(Err(e)) => Err(unresolvable(e.to_string())),
            Err(panic) => Err(unresolvable(format!(
                "factory panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
