//! Configuration models for the schedulers.

mod scheduler;

pub use scheduler::{ConfigPatch, SchedulerConfig, TaskOptions};
