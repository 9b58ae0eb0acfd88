//! # Fan-out of events to subscribers.
//!
//! [`SubscriberSet`] gives each subscriber its own bounded lane (an `mpsc`
//! queue plus a worker task), so a slow or broken subscriber only hurts
//! itself.
//!
//! ```text
//! emit(&ev) ── try_send ──┬──► lane "log-writer" ──► worker ──► on_event
//!                         ├──► lane "metrics"    ──► worker ──► on_event
//!                         └──► lane ...
//!   lane full / closed  ─► event dropped for that lane, SubscriberOverflow on the bus
//!   on_event panics     ─► SubscriberPanicked on the bus, worker keeps going
//! ```
//!
//! Each lane is FIFO; lanes are not ordered relative to each other.
//!
//! Panics are caught with `AssertUnwindSafe`. A subscriber that panics while
//! holding a lock on its own state may leave that state poisoned.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::policies::panic_message;
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and workers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber on the current Tokio runtime.
    ///
    /// Queue sizes come from [`Subscribe::queue_capacity`] (at least 1).
    /// Overflow and panic reports are published on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers): (Vec<Lane>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| {
                let name = sub.name();
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let worker = spawn_worker(sub, rx, bus.clone());
                (Lane { name, tx }, worker)
            })
            .unzip();

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Queues a copy of `event` on every lane without waiting.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Queues a shared event on every lane without waiting.
    ///
    /// Overflow of an overflow report is not reported again.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let report = event.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if report {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Closes every lane and waits for the workers to drain what is queued.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "subscriber worker did not finish cleanly");
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = sub.name();
        while let Some(ev) = rx.recv().await {
            if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
                let info = panic_message(payload.as_ref());
                tracing::warn!(subscriber = name, panic = %info, "subscriber panicked");
                bus.publish(Event::subscriber_panicked(name, info));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    /// Never drains its single-slot queue until released.
    struct Stuck {
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _ev: &Event) {
            self.release.notified().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_events_delivered_in_order_before_shutdown_returns() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>], Bus::new(16));
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::TaskStarting));
        set.emit(&Event::new(EventKind::TaskFailed));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![EventKind::TaskStarting, EventKind::TaskFailed]
        );
    }

    #[tokio::test]
    async fn test_panic_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicker), rec.clone()];
        let set = SubscriberSet::new(subs, bus);

        set.emit(&Event::new(EventKind::TaskSucceeded));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("panicker"));
        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::TaskSucceeded]);
    }

    #[tokio::test]
    async fn test_full_lane_reports_overflow() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let stuck = Arc::new(Stuck {
            release: tokio::sync::Notify::new(),
        });
        let set = SubscriberSet::new(vec![stuck.clone() as Arc<dyn Subscribe>], bus);

        // First event is taken by the worker, second fills the queue.
        set.emit(&Event::new(EventKind::TaskStarting));
        tokio::task::yield_now().await;
        set.emit(&Event::new(EventKind::TaskFailed));
        set.emit(&Event::new(EventKind::RetryScheduled));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.reason.as_deref(), Some("full"));

        stuck.release.notify_waiters();
        drop(set);
    }
}
