//! Error types used by strategies, tasks and the retry scheduler.
//!
//! This module defines three error enums:
//!
//! - [`StrategyError`] errors raised while building or consulting a retry strategy.
//! - [`TaskError`] errors returned by individual task executions.
//! - [`SubmitError`] errors returned to the caller of [`RetryScheduler::submit`](crate::RetryScheduler::submit).
//!
//! Each type provides `as_label` (stable snake_case) for logs/metrics.
//!
//! ## Propagation
//! ```text
//! construction-time misconfiguration ──► SubmitError (loud, immediate)
//! task failure / exhaustion          ──► consumed by the wrapper (silent, events only)
//! unresolvable custom strategy       ──► degrade to a single unwrapped run
//! ```

use std::borrow::Cow;

use thiserror::Error;

/// # Errors produced by retry strategies and the strategy resolver.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Strategy parameters are out of range (`max_tries < 1`, `multiplier < 1`).
    #[error("invalid strategy configuration: {reason}")]
    InvalidConfiguration {
        /// Which parameter was rejected and why.
        reason: Cow<'static, str>,
    },

    /// The try budget is spent; the task must not run again.
    #[error("max tries exceeded ({max_tries})")]
    Exhausted {
        /// The configured bound.
        max_tries: u32,
    },

    /// A custom strategy named by a task's retry config could not be built.
    #[error("custom strategy {name:?} is unresolvable: {reason}")]
    Unresolvable {
        /// Registry name of the strategy.
        name: Cow<'static, str>,
        /// What went wrong (unregistered, factory error, factory panic).
        reason: String,
    },
}

impl StrategyError {
    /// Shorthand for [`StrategyError::InvalidConfiguration`].
    pub fn invalid(reason: impl Into<Cow<'static, str>>) -> Self {
        StrategyError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::StrategyError;
    ///
    /// let err = StrategyError::Exhausted { max_tries: 3 };
    /// assert_eq!(err.as_label(), "strategy_exhausted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StrategyError::InvalidConfiguration { .. } => "strategy_invalid_configuration",
            StrategyError::Exhausted { .. } => "strategy_exhausted",
            StrategyError::Unresolvable { .. } => "strategy_unresolvable",
        }
    }

    /// True if this is the "stop retrying" signal.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, StrategyError::Exhausted { .. })
    }
}

/// # Errors produced by task execution.
///
/// Any [`TaskError::Fail`] drives the retry decision. [`TaskError::Canceled`]
/// ends the retry sequence when the submission was actually cancelled;
/// otherwise it is retried like a failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed; it may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled through its token.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything displayable.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// # Errors returned to the submitter.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The task's retry configuration could not be turned into a strategy.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// The scheduler was shut down; nothing was enqueued.
    #[error("scheduler is shut down")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Strategy(e) => e.as_label(),
            SubmitError::Closed => "submit_closed",
        }
    }
}
