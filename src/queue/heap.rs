//! Priority queue with a stable FIFO tie-break within equal priorities.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::EmptyQueueError;

/// Heap entry carrying the payload plus the ordering key.
///
/// `seq` is assigned from a monotone counter at enqueue time and is never
/// reset or reused, so entries sharing a priority always dequeue in their
/// enqueue order no matter how many heap operations happen in between.
struct HeapEntry<T> {
    item: T,
    priority: i64,
    seq: u64,
}

impl<T> PartialEq for HeapEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for HeapEntry<T> {}

impl<T> PartialOrd for HeapEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for HeapEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; within a priority the lower sequence wins
        // (reversed because BinaryHeap is a max-heap).
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            unequal => unequal,
        }
    }
}

/// Binary-heap queue ordering entries by (priority descending, insertion
/// sequence ascending). Enqueue and dequeue are O(log n).
pub struct PriorityQueue<T> {
    heap: BinaryHeap<HeapEntry<T>>,
    seq: u64,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Insert a payload at the given priority. Higher priorities dequeue
    /// first; equal priorities dequeue in insertion order.
    pub fn enqueue(&mut self, payload: T, priority: i64) {
        let seq = self.take_seq();
        self.heap.push(HeapEntry {
            item: payload,
            priority,
            seq,
        });
    }

    /// Insert a payload at an explicit, previously assigned sequence number.
    ///
    /// Used to re-admit a task so it keeps the tie-break rank from its first
    /// admission.
    pub(crate) fn enqueue_seq(&mut self, payload: T, priority: i64, seq: u64) {
        debug_assert!(seq < self.seq, "sequence must have been assigned earlier");
        self.heap.push(HeapEntry {
            item: payload,
            priority,
            seq,
        });
    }

    /// Claim the next sequence number.
    pub(crate) fn take_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Remove and return the highest-ranked payload.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyQueueError`] when the queue holds no entries.
    pub fn dequeue(&mut self) -> Result<T, EmptyQueueError> {
        self.heap.pop().map(|e| e.item).ok_or(EmptyQueueError)
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Discard all entries. The sequence counter is kept, not reset.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(T, i64)> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = (T, i64)>>(iter: I) -> Self {
        let mut q = Self::new();
        for (payload, priority) in iter {
            q.enqueue(payload, priority);
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        let mut q = PriorityQueue::new();
        q.enqueue("low", -5);
        q.enqueue("high", 10);
        q.enqueue("mid", 3);
        assert_eq!(q.dequeue().unwrap(), "high");
        assert_eq!(q.dequeue().unwrap(), "mid");
        assert_eq!(q.dequeue().unwrap(), "low");
        assert_eq!(q.dequeue(), Err(EmptyQueueError));
    }

    #[test]
    fn test_stable_tie_break() {
        // A(1), B(1), C(5) must dequeue as C, A, B.
        let mut q = PriorityQueue::new();
        q.enqueue("a", 1);
        q.enqueue("b", 1);
        q.enqueue("c", 5);
        assert_eq!(q.dequeue().unwrap(), "c");
        assert_eq!(q.dequeue().unwrap(), "a");
        assert_eq!(q.dequeue().unwrap(), "b");
    }

    #[test]
    fn test_tie_break_survives_interleaved_ops() {
        let mut q = PriorityQueue::new();
        q.enqueue(1u32, 0);
        q.enqueue(2, 0);
        q.enqueue(99, 9);
        assert_eq!(q.dequeue().unwrap(), 99);
        q.enqueue(3, 0);
        q.enqueue(98, 9);
        assert_eq!(q.dequeue().unwrap(), 98);
        // FIFO rank among equal priorities holds across the churn above.
        assert_eq!(q.dequeue().unwrap(), 1);
        assert_eq!(q.dequeue().unwrap(), 2);
        assert_eq!(q.dequeue().unwrap(), 3);
    }

    #[test]
    fn test_clear_keeps_sequence_counter() {
        let mut q = PriorityQueue::new();
        q.enqueue("x", 0);
        q.enqueue("y", 0);
        q.clear();
        assert!(q.is_empty());
        let next = q.take_seq();
        assert!(next >= 2, "counter must never be reset or reused");
    }

    #[test]
    fn test_reinserted_entry_keeps_rank() {
        let mut q = PriorityQueue::new();
        q.enqueue("first", 0);
        q.enqueue("second", 0);
        let head = q.dequeue().unwrap();
        assert_eq!(head, "first");
        // Re-admission at the original sequence outranks later peers.
        q.enqueue_seq(head, 0, 0);
        assert_eq!(q.dequeue().unwrap(), "first");
        assert_eq!(q.dequeue().unwrap(), "second");
    }

    #[test]
    fn test_from_iterator() {
        let mut q: PriorityQueue<_> = [("a", 1), ("b", 2), ("c", 1)].into_iter().collect();
        assert_eq!(q.len(), 3);
        assert_eq!(q.dequeue().unwrap(), "b");
        assert_eq!(q.dequeue().unwrap(), "a");
        assert_eq!(q.dequeue().unwrap(), "c");
    }
}
