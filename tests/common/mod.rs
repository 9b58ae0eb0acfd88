#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use retryvisor::{Event, EventKind, RetryConfig, Subscribe, TaskError, TaskFn, TaskRef};

/// Counts runs and records when each one started.
#[derive(Default)]
pub struct Tracker {
    runs: AtomicU32,
    started: Mutex<Vec<Instant>>,
}

impl Tracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn runs(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }

    /// Records a run and returns its 1-based index.
    pub fn hit(&self) -> u32 {
        self.started.lock().unwrap().push(Instant::now());
        self.runs.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Task failing on its first `failures` runs, then succeeding.
pub fn flaky(name: &'static str, failures: u32, retry: RetryConfig, tracker: &Arc<Tracker>) -> TaskRef {
    let tracker = Arc::clone(tracker);
    TaskFn::new(name, move |_ctx: CancellationToken| {
        let n = tracker.hit();
        async move {
            if n <= failures {
                Err(TaskError::fail(format!("run {n} failed")))
            } else {
                Ok(())
            }
        }
    })
    .with_retry(retry)
    .into_arc()
}

/// Task that never succeeds.
pub fn always_failing(name: &'static str, retry: RetryConfig, tracker: &Arc<Tracker>) -> TaskRef {
    flaky(name, u32::MAX, retry, tracker)
}

/// Subscriber keeping every event it sees.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.events.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
