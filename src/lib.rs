//! # workq
//!
//! A bounded-concurrency async task queue: submit units of asynchronous
//! work (optionally prioritized, delayed, and retry-eligible) and consume
//! their outcomes through an ordered output channel while at most
//! `max_workers` of them execute concurrently.
//!
//! ## Core pieces
//!
//! - **[`core::TaskScheduler`]**: FIFO admission, tasks start in
//!   submission order.
//! - **[`core::PriorityScheduler`]**: heap admission, tasks start in
//!   (priority descending, submission order ascending) order, with a stable
//!   tie-break that holds forever.
//! - **[`core::Outcome`]**: one per submitted task, carrying the success
//!   value or the captured failure once retries are exhausted.
//! - **[`queue::Fifo`]** / **[`queue::PriorityQueue`]**: the underlying
//!   containers, usable on their own.
//!
//! ## Ordering contract
//!
//! Each task's pending outcome enters the output queue at the moment the
//! task is dequeued for execution, not when it finishes. Consumers, whether
//! through [`dequeue`](core::TaskScheduler::dequeue), the
//! [`results`](core::TaskScheduler::results) stream, or
//! [`collect`](core::TaskScheduler::collect), therefore observe outcomes
//! in start order even though execution completes in arbitrary order.
//!
//! ## Failure model
//!
//! A failing unit of work never propagates out of the engine. It is retried
//! with exponential backoff (`backoff_base_ms * 2^attempts`) up to its
//! retry budget, and only then surfaced as an error-flavored [`core::Outcome`].
//! Lifecycle events (`start`, `retry`, `fail`, `end`) expose each attempt
//! to registered handlers.
//!
//! ```rust,ignore
//! use workq::config::{SchedulerConfig, TaskOptions};
//! use workq::core::{EventKind, PriorityScheduler};
//!
//! let queue = PriorityScheduler::with_factory(
//!     SchedulerConfig::new().with_max_workers(3).with_default_max_retries(2),
//!     |id: u32| async move { fetch_remote(id).await },
//! );
//! queue.on(EventKind::Fail, |event| {
//!     eprintln!("task {} failed, retrying in {:?}", event.order, event.delay);
//! });
//! queue.enqueue(7, TaskOptions::new().with_priority(10))?;
//! for outcome in queue.collect().await {
//!     println!("{:?}", outcome.value());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core engine, schedulers, outcomes, errors, and events.
pub mod core;
/// Configuration models and per-task options.
pub mod config;
/// Queue backends: plain FIFO and priority heap.
pub mod queue;
/// Runtime adapters for spawning task attempts.
pub mod runtime;
/// Shared utilities.
pub mod util;
