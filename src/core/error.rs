//! Error types for queue and scheduler operations.

use thiserror::Error;

/// A dequeue was attempted with no elements available.
///
/// For the scheduler front-ends this means no pending or in-flight work is
/// observable at all.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("queue is empty")]
pub struct EmptyQueueError;

/// Errors surfaced by scheduler operations.
///
/// Task failures are deliberately absent here: a failing unit of work is
/// captured into its [`Outcome`](crate::core::Outcome) after retries are
/// exhausted and never propagates out of the engine.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No pending or in-flight work for the consuming call.
    #[error(transparent)]
    Empty(#[from] EmptyQueueError),
    /// A plain value was submitted with no default factory configured.
    #[error("invalid request: configure a default factory or submit a unit of work")]
    MissingFactory,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for fallible async jobs, using anyhow for arbitrary causes.
pub type JobResult<T> = anyhow::Result<T>;
