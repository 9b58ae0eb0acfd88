//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Task`] and publishes its lifecycle events to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! TaskStarting ─► task.run() ─┬─ Ok(())                          ─► TaskSucceeded
//!                             ├─ Err(Canceled), parent cancelled ─► TaskCancelled
//!                             ├─ Err(Canceled), parent live      ─► TaskFailed
//!                             ├─ Err(Fail)                       ─► TaskFailed
//!                             └─ panic                           ─► TaskFailed ("task panicked: ...")
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event per attempt.
//! - A panic inside the task is caught and reported as [`TaskError::Fail`];
//!   it never unwinds into the executor's worker.
//! - The task gets a **child token** of the submission token; cancelling the
//!   submission reaches the running attempt.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio_util::sync::CancellationToken;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    policies::panic_message,
    tasks::Task,
};

/// Executes one attempt of `task`, publishing lifecycle events to `bus`.
pub(crate) async fn run_once<T: Task + ?Sized>(
    task: &T,
    parent: &CancellationToken,
    attempt: u32,
    bus: &Bus,
) -> Result<(), TaskError> {
    bus.publish(
        Event::new(EventKind::TaskStarting)
            .with_task(task.name())
            .with_attempt(attempt),
    );

    let res = match AssertUnwindSafe(task.run(parent.child_token()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic) => Err(TaskError::Fail {
            error: format!("task panicked: {}", panic_message(panic.as_ref())),
        }),
    };

    let ev = match &res {
        Ok(()) => Event::new(EventKind::TaskSucceeded),
        Err(TaskError::Canceled) if parent.is_cancelled() => {
            Event::new(EventKind::TaskCancelled)
        }
        Err(e) => Event::new(EventKind::TaskFailed).with_reason(e.to_string()),
    };
    bus.publish(ev.with_task(task.name()).with_attempt(attempt));

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskFn, TaskRef};

    #[tokio::test]
    async fn test_failure_published_with_reason() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let task: TaskRef = TaskFn::arc("t", |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("boom"))
        });

        let res = run_once(task.as_ref(), &CancellationToken::new(), 1, &bus).await;
        assert!(matches!(res, Err(TaskError::Fail { .. })));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskStarting);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.attempt, Some(1));
        assert_eq!(failed.reason.as_deref(), Some("execution failed: boom"));
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let bus = Bus::new(8);
        let task: TaskRef = TaskFn::arc("p", |_ctx: CancellationToken| async {
            if true {
                panic!("kaboom");
            }
            Ok::<(), TaskError>(())
        });

        let res = run_once(task.as_ref(), &CancellationToken::new(), 1, &bus).await;
        match res {
            Err(TaskError::Fail { error }) => assert!(error.contains("kaboom"), "{error}"),
            other => panic!("expected Fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_task_sees_parent_cancellation() {
        let bus = Bus::new(8);
        let parent = CancellationToken::new();
        parent.cancel();
        let task: TaskRef = TaskFn::arc("c", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            Ok(())
        });

        let mut rx = bus.subscribe();
        let res = run_once(task.as_ref(), &parent, 1, &bus).await;
        assert!(matches!(res, Err(TaskError::Canceled)));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskStarting);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskCancelled);
    }

    #[tokio::test]
    async fn test_canceled_without_cancellation_is_a_failure() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let task: TaskRef = TaskFn::arc("liar", |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::Canceled)
        });

        run_once(task.as_ref(), &CancellationToken::new(), 1, &bus).await.ok();

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskStarting);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TaskFailed);
        assert_eq!(failed.reason.as_deref(), Some("context cancelled"));
    }
}
