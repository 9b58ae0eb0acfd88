//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable) and its shared
//! handle [`TaskRef`].
//!
//! A task receives a [`CancellationToken`] and should check it to stop
//! cooperatively. A task type may carry a static [`RetryConfig`]; the
//! scheduler reads it once per submission.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::policies::RetryConfig;

/// # Shared handle to a task object.
///
/// The retry wrapper keeps one clone for the duration of its retry sequence.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use retryvisor::{RetryConfig, Task, TaskError};
///
/// struct Upload;
///
/// #[async_trait]
/// impl Task for Upload {
///     fn name(&self) -> &str { "upload" }
///
///     fn retry_config(&self) -> RetryConfig {
///         RetryConfig::fixed(Duration::from_millis(500), 3)
///     }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Static retry configuration of this task type.
    ///
    /// Default: [`RetryConfig::none`], i.e. run once without retries.
    fn retry_config(&self) -> RetryConfig {
        RetryConfig::none()
    }

    /// Executes one attempt.
    ///
    /// Any `Err` counts as a failure and may trigger a retry, unless it is
    /// [`TaskError::Canceled`] returned after `ctx` was cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
