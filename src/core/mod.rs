//! Runtime core: submission, retry state machine and execution boundary.
//!
//! The public API from this module is [`RetryScheduler`] (built through
//! [`RetrySchedulerBuilder`]), the [`Executor`] boundary and the
//! [`RetryHandle`] returned by every submission.
//!
//! Internal modules:
//! - [`runner`]: executes one attempt with panic isolation and event publishing;
//! - [`wrapper`]: retry state machine that reschedules itself after failures;
//! - [`scheduler`]: resolves strategies, enqueues jobs, owns the subscriber listener;
//! - [`executor`]: `execute` / `schedule` boundary and the Tokio implementation.

mod builder;
mod config;
mod executor;
mod handle;
mod runner;
mod scheduler;
mod wrapper;

pub use builder::RetrySchedulerBuilder;
pub use config::Config;
pub use executor::{Executor, ExecutorRef, Job, TokioExecutor};
pub use handle::RetryHandle;
pub use scheduler::RetryScheduler;
