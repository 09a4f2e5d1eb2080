//! Lifecycle event notifications emitted by the scheduler.

use std::sync::Arc;
use std::time::Duration;

/// Kinds of task lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A task began its first execution attempt.
    Start,
    /// A previously failed task began another attempt.
    Retry,
    /// An attempt failed and a retry was scheduled.
    Fail,
    /// A task reached its terminal outcome, success or exhausted retries.
    End,
}

/// Snapshot of a task's state delivered to event handlers.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Which notification this is.
    pub kind: EventKind,
    /// The task's submission order, fixed across retries.
    pub order: u64,
    /// The task's resolved priority.
    pub priority: i64,
    /// Failed attempts so far.
    pub attempts: u32,
    /// Concurrency counter at notification time.
    pub processing: usize,
    /// Computed backoff before the next attempt, on `Fail` events.
    pub delay: Option<Duration>,
    /// Rendered failure, on `Fail` events and failed `End` events.
    pub error: Option<String>,
}

/// Synchronous, fire-and-forget event callback.
///
/// Handlers run on the worker that produced the event and are required to be
/// non-panicking; the engine does not contain handler panics.
pub type Handler = Arc<dyn Fn(&TaskEvent) + Send + Sync>;

/// Handler table: at most one handler per event kind.
#[derive(Default)]
pub(crate) struct Handlers {
    start: Option<Handler>,
    retry: Option<Handler>,
    fail: Option<Handler>,
    end: Option<Handler>,
}

impl Handlers {
    /// Register a handler, replacing any previous one for the same kind.
    pub(crate) fn set(&mut self, kind: EventKind, handler: Handler) {
        match kind {
            EventKind::Start => self.start = Some(handler),
            EventKind::Retry => self.retry = Some(handler),
            EventKind::Fail => self.fail = Some(handler),
            EventKind::End => self.end = Some(handler),
        }
    }

    pub(crate) fn get(&self, kind: EventKind) -> Option<Handler> {
        match kind {
            EventKind::Start => self.start.clone(),
            EventKind::Retry => self.retry.clone(),
            EventKind::Fail => self.fail.clone(),
            EventKind::End => self.end.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_registration_replaces_previous_handler() {
        let hits = Arc::new(AtomicU32::new(0));
        let mut handlers = Handlers::default();

        let first = Arc::clone(&hits);
        handlers.set(
            EventKind::Start,
            Arc::new(move |_| {
                first.fetch_add(1, Ordering::Relaxed);
            }),
        );
        let second = Arc::clone(&hits);
        handlers.set(
            EventKind::Start,
            Arc::new(move |_| {
                second.fetch_add(10, Ordering::Relaxed);
            }),
        );

        let event = TaskEvent {
            kind: EventKind::Start,
            order: 1,
            priority: 0,
            attempts: 0,
            processing: 1,
            delay: None,
            error: None,
        };
        handlers.get(EventKind::Start).expect("registered")(&event);
        assert_eq!(hits.load(Ordering::Relaxed), 10);
        assert!(handlers.get(EventKind::End).is_none());
    }
}
