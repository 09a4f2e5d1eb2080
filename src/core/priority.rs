//! Prioritized scheduler: the core engine with priority admission.

use std::future::Future;
use std::sync::Arc;

use futures::stream::Stream;

use crate::config::{ConfigPatch, SchedulerConfig, TaskOptions};
use crate::core::error::SchedulerError;
use crate::core::event::{EventKind, TaskEvent};
use crate::core::outcome::Outcome;
use crate::core::scheduler::Scheduler;
use crate::core::task::TaskRecord;
use crate::queue::PriorityQueue;
use crate::runtime::{Spawn, TokioSpawner};

/// Bounded-concurrency task scheduler with priority admission.
///
/// Identical contract to [`TaskScheduler`](crate::core::TaskScheduler)
/// except that admitted tasks start in (priority descending, submission
/// order ascending) order. Every submission resolves a priority: explicit
/// per-call value, else the configured `default_priority`, else zero.
/// Retried tasks re-admit at their original priority and tie-break rank.
pub struct PriorityScheduler<I, O, S = TokioSpawner> {
    inner: Scheduler<I, O, PriorityQueue<TaskRecord<O>>, S>,
}

impl<I, O, S> Clone for PriorityScheduler<I, O, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I, O> PriorityScheduler<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    /// Create a scheduler spawning onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_spawner(config, TokioSpawner::current())
    }

    /// Create a scheduler with a default factory bound for plain-value
    /// submissions.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn with_factory<F, Fut>(config: SchedulerConfig, factory: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let scheduler = Self::new(config);
        scheduler.set_factory(factory);
        scheduler
    }

    /// Create a scheduler pre-loaded with a batch of values at the default
    /// priority.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn from_values<V, F, Fut>(values: V, config: SchedulerConfig, factory: F) -> Self
    where
        V: IntoIterator<Item = I>,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let scheduler = Self::with_factory(config, factory);
        let _ = scheduler.extend(values);
        scheduler
    }
}

impl<I, O, S> PriorityScheduler<I, O, S>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler spawning onto a custom runtime seam.
    #[must_use]
    pub fn with_spawner(config: SchedulerConfig, spawner: S) -> Self {
        Self {
            inner: Scheduler::new(config, PriorityQueue::new(), spawner),
        }
    }

    /// Bind (or replace) the default factory used for plain-value
    /// submissions.
    pub fn set_factory<F, Fut>(&self, factory: F)
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        self.inner.set_factory(factory);
    }

    /// Shallow-merge new defaults into the scheduler configuration. Affects
    /// only subsequently enqueued tasks.
    pub fn with_config(&self, patch: ConfigPatch) -> &Self {
        self.inner.with_config(&patch);
        self
    }

    /// Register a handler for an event kind, replacing any previous one.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&TaskEvent) + Send + Sync + 'static,
    {
        self.inner.on(kind, Arc::new(handler));
    }

    /// Admitted-but-unstarted tasks plus unconsumed output entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Whether no work is admitted or awaiting consumption.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Submit a value to be run through the default factory, at
    /// `opts.priority` or the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingFactory`] when no factory is bound.
    pub fn enqueue(&self, value: I, opts: TaskOptions) -> Result<(), SchedulerError> {
        self.inner.enqueue_value(value, opts)
    }

    /// Submit a zero-argument unit of work directly; no factory required.
    pub fn enqueue_with<F, Fut>(&self, unit: F, opts: TaskOptions)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        self.inner.enqueue_unit(unit, opts);
    }

    /// Submit a batch of values at the default priority.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingFactory`] when no factory is bound.
    pub fn extend<V>(&self, values: V) -> Result<(), SchedulerError>
    where
        V: IntoIterator<Item = I>,
    {
        self.inner.enqueue_values(values)
    }

    /// Await the next outcome in start order, starting the highest-priority
    /// admitted work first.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Empty`] when no pending or in-flight work
    /// exists.
    pub async fn dequeue(&self) -> Result<Outcome<O>, SchedulerError> {
        self.inner.dequeue().await
    }

    /// Drain the whole backlog, including work spawned by retries during the
    /// drain, preserving start order.
    pub async fn collect(&self) -> Vec<Outcome<O>> {
        self.inner.collect().await
    }

    /// Lazy stream yielding exactly `size`-at-call outcomes. Each call
    /// starts a fresh sequence.
    pub fn results(&self) -> impl Stream<Item = Outcome<O>> {
        self.inner.results()
    }

    /// Discard all pending admissions and output entries. In-flight work
    /// still settles and fires events, but its outcome is dropped.
    pub fn clear(&self) {
        self.inner.clear();
    }
}
