//! Bounded-concurrency engine and the FIFO-admission scheduler front-end.
//!
//! The engine owns an admission queue, an output queue of pending outcomes,
//! and a concurrency counter. Consumption calls top up workers: admitted
//! tasks are dequeued and spawned while capacity allows, and each task's
//! pending outcome enters the output queue at the moment it is dequeued for
//! execution. Consumers therefore observe outcomes in start order even
//! though execution itself finishes in arbitrary order.

use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};

use crate::config::{ConfigPatch, SchedulerConfig, TaskOptions};
use crate::core::error::{EmptyQueueError, SchedulerError};
use crate::core::event::{EventKind, Handler, Handlers, TaskEvent};
use crate::core::outcome::Outcome;
use crate::core::task::{Admission, FactoryFn, Job, TaskRecord};
use crate::queue::Fifo;
use crate::runtime::{Spawn, TokioSpawner};

/// Admission queue plus the output channel, guarded together so that
/// dequeue-for-execution and the output-slot push are a single step.
struct State<O, Q> {
    admission: Q,
    output: Fifo<oneshot::Receiver<Outcome<O>>>,
}

/// Shared scheduler state. Everything a spawned attempt needs lives here.
struct Engine<I, O, Q, S> {
    config: Mutex<SchedulerConfig>,
    factory: Mutex<Option<FactoryFn<I, O>>>,
    state: Mutex<State<O, Q>>,
    /// Number of attempts currently executing; also the worker count, since
    /// every admitted task occupies exactly one worker slot.
    processing: AtomicUsize,
    handlers: Mutex<Handlers>,
    /// Wakes consumers parked on an output slot that does not exist yet.
    wake: Notify,
    spawner: S,
}

impl<I, O, Q, S> Engine<I, O, Q, S>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
    Q: Admission<O> + 'static,
    S: Spawn + Send + Sync + 'static,
{
    fn new(config: SchedulerConfig, admission: Q, spawner: S) -> Arc<Self> {
        Arc::new(Self {
            config: Mutex::new(config),
            factory: Mutex::new(None),
            state: Mutex::new(State {
                admission,
                output: Fifo::new(),
            }),
            processing: AtomicUsize::new(0),
            handlers: Mutex::new(Handlers::default()),
            wake: Notify::new(),
            spawner,
        })
    }

    fn size(&self) -> usize {
        let state = self.state.lock();
        state.admission.len() + state.output.len()
    }

    /// Admit a new task. Nothing executes until a consumer drives the queue.
    fn submit(&self, job: Job<O>, opts: TaskOptions) {
        let (max_retries, delay_ms, priority) = {
            let config = self.config.lock();
            (
                opts.max_retries.unwrap_or(config.default_max_retries),
                opts.delay_ms.unwrap_or(config.default_delay_ms),
                opts.priority.unwrap_or(config.default_priority),
            )
        };
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();
        let order = (state.admission.len() + state.output.len()) as u64 + 1;
        tracing::debug!(order, priority, max_retries, delay_ms, "task admitted");
        state.admission.admit(TaskRecord {
            order,
            priority,
            rank: None,
            attempts: 0,
            max_retries,
            delay: Duration::from_millis(delay_ms),
            job,
            outcome_tx: Some(tx),
            outcome_rx: Some(rx),
        });
        drop(state);
        self.wake.notify_waiters();
    }

    /// Top up workers: start admitted tasks while capacity allows. The
    /// output slot is pushed before the attempt is spawned, under the same
    /// lock as the admission dequeue, which is what fixes start order.
    fn pump(this: &Arc<Self>) {
        let max_workers = this.config.lock().max_workers;
        let mut state = this.state.lock();
        while this.processing.load(Ordering::Acquire) < max_workers {
            let Some(mut record) = state.admission.next() else {
                break;
            };
            this.processing.fetch_add(1, Ordering::AcqRel);
            if let Some(rx) = record.outcome_rx.take() {
                state.output.enqueue(rx);
            }
            let engine = Arc::clone(this);
            this.spawner
                .spawn(async move { Self::run_attempt(engine, record).await });
        }
        drop(state);
        this.wake.notify_waiters();
    }

    /// Execute one attempt of a task, then either re-admit it for retry or
    /// resolve its outcome.
    async fn run_attempt(this: Arc<Self>, mut record: TaskRecord<O>) {
        let kind = if record.attempts > 0 {
            EventKind::Retry
        } else {
            EventKind::Start
        };
        this.notify(kind, &record, None, None);
        if !record.delay.is_zero() {
            tokio::time::sleep(record.delay).await;
        }

        let outcome = (record.job)().await;
        this.processing.fetch_sub(1, Ordering::AcqRel);

        match outcome {
            Err(error) if record.attempts < record.max_retries => {
                let backoff_ms = {
                    let config = this.config.lock();
                    config
                        .backoff_base_ms
                        .saturating_mul(2u64.saturating_pow(record.attempts))
                };
                record.delay = Duration::from_millis(backoff_ms);
                record.attempts += 1;
                tracing::debug!(
                    order = record.order,
                    attempts = record.attempts,
                    backoff_ms,
                    "attempt failed, task re-admitted"
                );
                this.notify(EventKind::Fail, &record, Some(record.delay), Some(&error));
                this.state.lock().admission.admit(record);
            }
            terminal => {
                tracing::debug!(
                    order = record.order,
                    ok = terminal.is_ok(),
                    "task reached terminal outcome"
                );
                this.notify(EventKind::End, &record, None, terminal.as_ref().err());
                if let Some(tx) = record.outcome_tx.take() {
                    // Fails when the output queue was cleared mid-flight;
                    // the events above still fired for the completed work.
                    let _ = tx.send(Outcome::from_result(terminal));
                }
            }
        }
        Self::pump(&this);
    }

    /// Pull the next settled outcome, topping up workers first. Waits when
    /// admitted work exists but no output slot is ready yet.
    async fn next_outcome(this: &Arc<Self>) -> Result<Outcome<O>, SchedulerError> {
        loop {
            Self::pump(this);
            let mut parked = pin!(this.wake.notified());
            parked.as_mut().enable();
            let (slot, backlog) = {
                let mut state = this.state.lock();
                let slot = state.output.dequeue().ok();
                (slot, state.admission.len() + state.output.len())
            };
            match slot {
                Some(rx) => {
                    let outcome = rx.await.unwrap_or_else(|_| {
                        Outcome::from_result(Err(anyhow::anyhow!(
                            "task was dropped before completing"
                        )))
                    });
                    return Ok(outcome);
                }
                None if backlog == 0 => return Err(EmptyQueueError.into()),
                None => parked.await,
            }
        }
    }

    fn notify(
        &self,
        kind: EventKind,
        record: &TaskRecord<O>,
        delay: Option<Duration>,
        error: Option<&anyhow::Error>,
    ) {
        let Some(handler) = self.handlers.lock().get(kind) else {
            return;
        };
        handler(&TaskEvent {
            kind,
            order: record.order,
            priority: record.priority,
            attempts: record.attempts,
            processing: self.processing.load(Ordering::Acquire),
            delay,
            error: error.map(|e| format!("{e:#}")),
        });
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.admission.clear();
        state.output.clear();
        tracing::debug!("scheduler cleared");
    }
}

/// Queue-flavor-agnostic scheduler core shared by the two front-ends.
pub(crate) struct Scheduler<I, O, Q, S> {
    engine: Arc<Engine<I, O, Q, S>>,
}

impl<I, O, Q, S> Clone for Scheduler<I, O, Q, S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<I, O, Q, S> Scheduler<I, O, Q, S>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
    Q: Admission<O> + 'static,
    S: Spawn + Send + Sync + 'static,
{
    pub(crate) fn new(config: SchedulerConfig, admission: Q, spawner: S) -> Self {
        Self {
            engine: Engine::new(config, admission, spawner),
        }
    }

    pub(crate) fn set_factory<F, Fut>(&self, factory: F)
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let wrapped: FactoryFn<I, O> = Arc::new(
            move |value: I| -> BoxFuture<'static, anyhow::Result<O>> { Box::pin(factory(value)) },
        );
        *self.engine.factory.lock() = Some(wrapped);
    }

    pub(crate) fn with_config(&self, patch: &ConfigPatch) {
        patch.apply(&mut self.engine.config.lock());
        self.engine.wake.notify_waiters();
    }

    pub(crate) fn on(&self, kind: EventKind, handler: Handler) {
        self.engine.handlers.lock().set(kind, handler);
    }

    pub(crate) fn size(&self) -> usize {
        self.engine.size()
    }

    pub(crate) fn enqueue_value(
        &self,
        value: I,
        opts: TaskOptions,
    ) -> Result<(), SchedulerError> {
        let factory = self
            .engine
            .factory
            .lock()
            .clone()
            .ok_or(SchedulerError::MissingFactory)?;
        self.engine
            .submit(Arc::new(move || factory(value.clone())), opts);
        Ok(())
    }

    pub(crate) fn enqueue_values<V>(&self, values: V) -> Result<(), SchedulerError>
    where
        V: IntoIterator<Item = I>,
    {
        let factory = self
            .engine
            .factory
            .lock()
            .clone()
            .ok_or(SchedulerError::MissingFactory)?;
        for value in values {
            let factory = Arc::clone(&factory);
            self.engine
                .submit(Arc::new(move || factory(value.clone())), TaskOptions::new());
        }
        Ok(())
    }

    pub(crate) fn enqueue_unit<F, Fut>(&self, unit: F, opts: TaskOptions)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        let job: Job<O> = Arc::new(move || -> BoxFuture<'static, anyhow::Result<O>> {
            Box::pin(unit())
        });
        self.engine.submit(job, opts);
    }

    pub(crate) async fn dequeue(&self) -> Result<Outcome<O>, SchedulerError> {
        Engine::next_outcome(&self.engine).await
    }

    pub(crate) async fn collect(&self) -> Vec<Outcome<O>> {
        let mut outcomes = Vec::new();
        while self.engine.size() > 0 {
            match Engine::next_outcome(&self.engine).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => break,
            }
        }
        outcomes
    }

    pub(crate) fn results(&self) -> impl Stream<Item = Outcome<O>> {
        let engine = Arc::clone(&self.engine);
        stream::unfold(self.engine.size(), move |remaining| {
            let engine = Arc::clone(&engine);
            async move {
                if remaining == 0 {
                    return None;
                }
                match Engine::next_outcome(&engine).await {
                    Ok(outcome) => Some((outcome, remaining - 1)),
                    Err(_) => None,
                }
            }
        })
    }

    pub(crate) fn clear(&self) {
        self.engine.clear();
    }
}

/// Bounded-concurrency task scheduler with FIFO admission.
///
/// Submitted values are turned into asynchronous work by a factory (or
/// submitted directly as units of work via [`TaskScheduler::enqueue_with`]),
/// executed by at most `max_workers` concurrent workers, and consumed as
/// [`Outcome`]s in start order.
///
/// ```rust,ignore
/// use workq::config::{SchedulerConfig, TaskOptions};
/// use workq::core::TaskScheduler;
///
/// let queue = TaskScheduler::with_factory(
///     SchedulerConfig::new().with_max_workers(4),
///     |n: u32| async move { Ok(n * n) },
/// );
/// queue.enqueue(3, TaskOptions::new())?;
/// let squared = queue.dequeue().await?.unwrap_or(0);
/// ```
pub struct TaskScheduler<I, O, S = TokioSpawner> {
    inner: Scheduler<I, O, Fifo<TaskRecord<O>>, S>,
}

impl<I, O, S> Clone for TaskScheduler<I, O, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I, O> TaskScheduler<I, O>
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

    /// Create a scheduler pre-loaded with a batch of values.
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
        // A factory is bound above, so batch admission cannot fail.
        let _ = scheduler.extend(values);
        scheduler
    }
}

impl<I, O, S> TaskScheduler<I, O, S>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler spawning onto a custom runtime seam.
    #[must_use]
    pub fn with_spawner(config: SchedulerConfig, spawner: S) -> Self {
        Self {
            inner: Scheduler::new(config, Fifo::new(), spawner),
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

    /// Submit a value to be run through the default factory.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingFactory`] when no factory is bound.
    pub fn enqueue(&self, value: I, opts: TaskOptions) -> Result<(), SchedulerError> {
        self.inner.enqueue_value(value, opts)
    }

    /// Submit a zero-argument unit of work directly; no factory required.
    /// The unit is re-invoked for every retry attempt.
    pub fn enqueue_with<F, Fut>(&self, unit: F, opts: TaskOptions)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        self.inner.enqueue_unit(unit, opts);
    }

    /// Submit a batch of values with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingFactory`] when no factory is bound;
    /// no value is admitted in that case.
    pub fn extend<V>(&self, values: V) -> Result<(), SchedulerError>
    where
        V: IntoIterator<Item = I>,
    {
        self.inner.enqueue_values(values)
    }

    /// Await the next outcome in start order, starting admitted work first.
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
