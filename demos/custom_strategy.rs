//! # Example: custom_strategy
//!
//! Registers a user-defined [`RetryStrategy`] under a name and lets a task
//! refer to it from its [`RetryConfig`]. Also shows the fallback when a task
//! names a strategy nobody registered: it simply runs once.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_strategy
//! ```

use std::time::Duration;

use retryvisor::{
    Config, EventKind, RetryConfig, RetryScheduler, RetryStrategy, StrategyError,
    StrategyResolver, TaskError, TaskFn, TaskRef, TryCounter,
};
use tokio_util::sync::CancellationToken;

/// Waits a fixed 50ms, then 500ms for every later retry.
struct FastThenSlow {
    counter: TryCounter,
}

impl Default for FastThenSlow {
    fn default() -> Self {
        Self {
            counter: TryCounter::new(3).expect("3 is a valid budget"),
        }
    }
}

impl RetryStrategy for FastThenSlow {
    fn next_delay(&self) -> Result<Duration, StrategyError> {
        match self.counter.advance()? {
            1 => Ok(Duration::from_millis(50)),
            _ => Ok(Duration::from_millis(500)),
        }
    }

    fn name(&self) -> &str {
        "fast-then-slow"
    }
}

fn failing(name: &'static str, strategy: &'static str) -> TaskRef {
    TaskFn::new(name, move |_ctx: CancellationToken| async move {
        println!("[{name}] running");
        Err::<(), _>(TaskError::fail("not yet"))
    })
    .with_retry(RetryConfig::custom(strategy))
    .into_arc()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut resolver = StrategyResolver::new();
    resolver.register::<FastThenSlow>("fast-then-slow");

    let sched = RetryScheduler::builder(Config::default())
        .with_resolver(resolver)
        .build();
    let mut rx = sched.subscribe();

    sched.submit(failing("registered", "fast-then-slow"))?;
    sched.submit(failing("unregistered", "no-such-strategy"))?;

    let printer = tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            let task = ev.task.as_deref().unwrap_or("-");
            match ev.kind {
                EventKind::RetryScheduled => {
                    println!("[{task}] retry in {}ms", ev.delay_ms.unwrap_or(0));
                }
                EventKind::RetriesExhausted => println!("[{task}] gave up"),
                EventKind::StrategyUnresolved => {
                    println!("[{task}] {}", ev.reason.as_deref().unwrap_or(""));
                }
                _ => {}
            }
        }
    });

    tokio::time::sleep(Duration::from_secs(2)).await;
    sched.shutdown().await;
    printer.abort();
    Ok(())
}
