//! # retryvisor
//!
//! **Retryvisor** re-runs failed fire-and-forget tasks according to a
//! pluggable retry strategy, on top of an executor you already have.
//!
//! A task is submitted once. If it fails, a strategy decides how long to wait
//! before the next attempt, or that the budget is spent. Failures and
//! exhaustion are never returned to the submitter; they are published as
//! [`Event`]s.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │     Task     │   │     Task     │
//!     │ + RetryConfig│   │ + RetryConfig│   │ + strategy   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ submit()         ▼ submit()         ▼ submit_with()
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RetryScheduler                                                   │
//! │  - StrategyResolver (RetryConfig ─► fresh strategy per submission)│
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ RetryingTask │   │  single run  │   │ RetryingTask │   │
//!     │ (state mach.)│   │  (no config) │   │ (state mach.)│   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ execute/schedule │ execute          │                 │
//!      ▼                  ▼                  ▼                 │
//! ┌───────────────────────────────────────────────────────────┐ │
//! │            Executor (TokioExecutor or your own)           │ │
//! └───────────────────────────────────────────────────────────┘ │
//!      │ Publishes: TaskStarting, TaskFailed, RetryScheduled,   │
//!      │            RetriesExhausted, TaskCancelled, ...        │
//!      ▼                                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌─────────┼─────────┐
//!                          ▼         ▼         ▼
//!                       worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle of a wrapped submission
//! ```text
//! submit ──► executor.execute(job)
//!
//! job:
//!   ├─► token cancelled?            ─► TaskCancelled, stop
//!   ├─► attempt += 1, TaskStarting
//!   ├─► task.run(child token)
//!   │       ├─ Ok                        ─► TaskSucceeded, stop
//!   │       ├─ Canceled, token cancelled ─► TaskCancelled, stop
//!   │       └─ any other Err / panic     ─► TaskFailed
//!   │                          └─ strategy.next_delay()
//!   │                               ├─ Ok(d)  ─► RetryScheduled, executor.schedule(job, d, token)
//!   │                               └─ Err    ─► RetriesExhausted, stop
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                                   |
//! |-------------------|-------------------------------------------------------------|------------------------------------------------------|
//! | **Strategies**    | Decide the delay before each retry, or stop.                | [`RetryStrategy`], [`ConstantDelay`], [`ExponentialBackoff`] |
//! | **Configuration** | Declarative per-task retry config and a custom registry.    | [`RetryConfig`], [`StrategyResolver`], [`Config`]    |
//! | **Scheduling**    | Submit tasks, cancel them, shut down.                       | [`RetryScheduler`], [`RetryHandle`]                  |
//! | **Execution**     | Plug in the thread pool that runs attempts.                 | [`Executor`], [`TokioExecutor`]                      |
//! | **Subscriber API**| Observe attempts, retries and exhaustion.                   | [`Subscribe`], [`Event`]                             |
//! | **Errors**        | Typed errors for strategies, tasks and submission.          | [`StrategyError`], [`TaskError`], [`SubmitError`]    |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber writing through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use retryvisor::{Config, RetryConfig, RetryScheduler, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched = RetryScheduler::builder(Config::default()).build();
//!
//!     let flaky = TaskFn::new("flaky", |_ctx: CancellationToken| async move {
//!         Err::<(), _>(TaskError::fail("remote unavailable"))
//!     })
//!     .with_retry(RetryConfig::fixed(Duration::from_millis(10), 3))
//!     .into_arc();
//!
//!     let handle = sched.submit(flaky)?;
//!     assert_eq!(handle.name(), "flaky");
//!
//!     sched.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod strategies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Config, Executor, ExecutorRef, Job, RetryHandle, RetryScheduler, RetrySchedulerBuilder,
    TokioExecutor,
};
pub use error::{StrategyError, SubmitError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{CustomStrategy, ExponentialDelay, FixedDelay, RetryConfig, StrategyResolver};
pub use strategies::{ConstantDelay, ExponentialBackoff, RetryStrategy, StrategyRef, TryCounter};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
