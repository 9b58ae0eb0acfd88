use std::sync::Arc;

use crate::{
    core::{
        config::Config,
        executor::{ExecutorRef, TokioExecutor},
        scheduler::RetryScheduler,
    },
    events::Bus,
    policies::StrategyResolver,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`RetryScheduler`].
pub struct RetrySchedulerBuilder {
    cfg: Config,
    executor: Option<ExecutorRef>,
    resolver: StrategyResolver,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RetrySchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            executor: None,
            resolver: StrategyResolver::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the executor that runs every attempt.
    ///
    /// Defaults to [`TokioExecutor::current`].
    pub fn with_executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the registry used to build custom strategies named by tasks.
    pub fn with_resolver(mut self, resolver: StrategyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive runtime events (submissions, failures, retries,
    /// exhaustion) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the scheduler.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime: subscriber workers and the
    /// default executor are bound to the current runtime.
    pub fn build(self) -> Arc<RetryScheduler> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(TokioExecutor::current()));

        Arc::new(RetryScheduler::new_internal(
            self.cfg,
            executor,
            self.resolver,
            bus,
            subs,
        ))
    }
}
