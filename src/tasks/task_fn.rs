//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per attempt.
//!
//! ## Concurrency semantics
//! - Each call to [`Task::run`] creates a **new** future owning its own state.
//! - No hidden mutation between attempts; shared state must go through an
//!   explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{RetryConfig, Task, TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef = TaskFn::arc("worker", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok::<_, TaskError>(())
//! });
//! assert_eq!(t.name(), "worker");
//! assert!(t.retry_config().is_empty());
//!
//! let retried = TaskFn::new("flaky", |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) })
//!     .with_retry(RetryConfig::exponential(Duration::from_millis(100), 2, 4));
//! assert!(retried.retry_config().exponential.is_some());
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::policies::RetryConfig;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per attempt, plus an optional
/// static retry configuration.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    retry: RetryConfig,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task without retry configuration.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            retry: RetryConfig::none(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Attaches a static retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Finishes building and returns a shared handle.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn retry_config(&self) -> RetryConfig {
        self.retry.clone()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
