//! # Example: retry_on_failure
//!
//! A task fails twice before succeeding. The scheduler retries it with a
//! constant delay; every step is written to the console by [`LogWriter`].
//!
//! A second task never succeeds and shows what exhaustion looks like.
//!
//! ## Flow
//! ```text
//! submit(flaky) ──► executor.execute(job)
//!   ├─► TaskStarting(attempt=1) → Err("boom #1") → TaskFailed
//!   ├─► RetryScheduled(delay=200ms) ──► executor.schedule(job, 200ms, token)
//!   ├─► TaskStarting(attempt=2) → Err("boom #2") → TaskFailed
//!   ├─► RetryScheduled(delay=200ms)
//!   └─► TaskStarting(attempt=3) → Ok → TaskSucceeded
//!
//! submit(down) ──► ... ──► RetriesExhausted(attempt=3)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example retry_on_failure --features logging
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use retryvisor::{
    Config, LogWriter, RetryConfig, RetryScheduler, Subscribe, TaskError, TaskFn, TaskRef,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

static FLAKY_RUNS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    // 1. Scheduler with a log subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let sched = RetryScheduler::builder(Config::default())
        .with_subscribers(subs)
        .build();

    // 2. Fails twice, then succeeds
    let flaky: TaskRef = TaskFn::new("flaky", |_ctx: CancellationToken| async move {
        let run = FLAKY_RUNS.fetch_add(1, Ordering::Relaxed) + 1;
        if run <= 2 {
            return Err(TaskError::fail(format!("boom #{run}")));
        }
        println!("[flaky] success on run {run}");
        Ok(())
    })
    .with_retry(RetryConfig::fixed(Duration::from_millis(200), 5))
    .into_arc();

    // 3. Never succeeds: 1 run + 2 retries, then exhausted
    let down: TaskRef = TaskFn::new("down", |_ctx: CancellationToken| async move {
        Err::<(), _>(TaskError::fail("service unavailable"))
    })
    .with_retry(RetryConfig::exponential(Duration::from_millis(100), 2, 2))
    .into_arc();

    sched.submit(flaky)?;
    sched.submit(down)?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    sched.shutdown().await;
    Ok(())
}
