//! Core scheduling engine, error taxonomy, outcomes, and events.

pub mod error;
pub mod event;
pub mod outcome;
pub mod priority;
pub mod scheduler;
pub(crate) mod task;

pub use error::{EmptyQueueError, JobResult, SchedulerError};
pub use event::{EventKind, Handler, TaskEvent};
pub use outcome::Outcome;
pub use priority::PriorityScheduler;
pub use scheduler::TaskScheduler;
