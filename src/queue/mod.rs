//! Queue backends: plain FIFO and priority heap.

pub mod fifo;
pub mod heap;

pub use fifo::Fifo;
pub use heap::PriorityQueue;
