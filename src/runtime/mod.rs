//! Runtime seam: how the engine spawns task attempts.

mod tokio_spawner;

use std::future::Future;

pub use tokio_spawner::TokioSpawner;

/// Abstraction over the async runtime used to run task attempts in the
/// background.
pub trait Spawn {
    /// Spawn a future to completion.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
