//! Plain FIFO queue used for admission and as the ordered output channel.

use std::collections::VecDeque;

use crate::core::EmptyQueueError;

/// First-in first-out queue with O(1) enqueue and dequeue.
///
/// The scheduler uses this both as the default admission queue and as the
/// output channel, so its dequeue order is what fixes the start-order
/// delivery contract.
#[derive(Debug)]
pub struct Fifo<T> {
    items: VecDeque<T>,
}

impl<T> Fifo<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append an element at the tail.
    pub fn enqueue(&mut self, element: T) {
        self.items.push_back(element);
    }

    /// Remove and return the head element.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueueError`] when the queue holds no elements.
    pub fn dequeue(&mut self) -> Result<T, EmptyQueueError> {
        self.items.pop_front().ok_or(EmptyQueueError)
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discard all elements.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Fifo<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Fifo<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
