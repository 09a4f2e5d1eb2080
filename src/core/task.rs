//! Per-submission task state and the admission-queue seam.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::core::outcome::Outcome;
use crate::queue::{Fifo, PriorityQueue};

/// A bound, re-invocable unit of work. Invoked once per attempt.
pub(crate) type Job<O> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<O>> + Send + Sync>;

/// Turns a submitted value into an asynchronous operation.
pub(crate) type FactoryFn<I, O> =
    Arc<dyn Fn(I) -> BoxFuture<'static, anyhow::Result<O>> + Send + Sync>;

/// State threaded through a task's lifetime, carried across retries.
pub(crate) struct TaskRecord<O> {
    /// Submission order, fixed at first admission.
    pub order: u64,
    /// Resolved priority; ignored by FIFO admission.
    pub priority: i64,
    /// Tie-break sequence assigned by the priority queue at first admission,
    /// reused on retry re-admissions so the task keeps its rank.
    pub rank: Option<u64>,
    /// Failed attempts so far; incremented only when a retry is scheduled.
    pub attempts: u32,
    /// Retry budget.
    pub max_retries: u32,
    /// Sleep before the next attempt: the initial delay on first admission,
    /// the computed backoff on retries.
    pub delay: Duration,
    pub job: Job<O>,
    /// Resolves the task's single outcome once it is terminal. Absent after
    /// the output queue was cleared mid-flight.
    pub outcome_tx: Option<oneshot::Sender<Outcome<O>>>,
    /// Pending-outcome receiver, moved into the output queue when the task
    /// first starts. Absent on retry re-admissions.
    pub outcome_rx: Option<oneshot::Receiver<Outcome<O>>>,
}

/// Admission-side seam between the engine and its queue flavor.
pub(crate) trait Admission<O>: Send {
    fn admit(&mut self, record: TaskRecord<O>);
    fn next(&mut self) -> Option<TaskRecord<O>>;
    fn len(&self) -> usize;
    fn clear(&mut self);
}

impl<O: Send> Admission<O> for Fifo<TaskRecord<O>> {
    fn admit(&mut self, record: TaskRecord<O>) {
        self.enqueue(record);
    }

    fn next(&mut self) -> Option<TaskRecord<O>> {
        self.dequeue().ok()
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }
}

impl<O: Send> Admission<O> for PriorityQueue<TaskRecord<O>> {
    fn admit(&mut self, mut record: TaskRecord<O>) {
        let priority = record.priority;
        match record.rank {
            Some(seq) => self.enqueue_seq(record, priority, seq),
            None => {
                let seq = self.take_seq();
                record.rank = Some(seq);
                self.enqueue_seq(record, priority, seq);
            }
        }
    }

    fn next(&mut self) -> Option<TaskRecord<O>> {
        self.dequeue().ok()
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }
}
