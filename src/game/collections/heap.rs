use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Priority of an open-set entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpenKey {
    /// Estimated total cost (`g + h`).
    pub f_cost: u32,
    /// Heuristic estimate to the goal.
    pub h_cost: u32,
}

impl OpenKey {
    pub fn new(g_cost: u32, h_cost: u32) -> Self {
        Self {
            f_cost: g_cost + h_cost,
            h_cost,
        }
    }
}

/// Strict weak ordering over open-set keys: lower `f_cost` first, ties broken by lower `h_cost`.
#[inline]
pub fn compare_open(a: &OpenKey, b: &OpenKey) -> Ordering {
    a.f_cost.cmp(&b.f_cost).then(a.h_cost.cmp(&b.h_cost))
}

struct OpenEntry<T> {
    key: OpenKey,
    seq: u64,
    item: T,
}

// std's BinaryHeap is a max-heap, so the comparison is reversed. Equal keys pop in
// insertion order, which keeps searches deterministic.
impl<T> Ord for OpenEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_open(&other.key, &self.key).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for OpenEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for OpenEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl<T> Eq for OpenEntry<T> {}

/// Binary min-heap ordered by [`compare_open`].
pub struct OpenHeap<T> {
    heap: BinaryHeap<OpenEntry<T>>,
    next_seq: u64,
}

impl<T> Default for OpenHeap<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> OpenHeap<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, key: OpenKey, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(OpenEntry { key, seq, item });
    }

    pub fn pop(&mut self) -> Option<(OpenKey, T)> {
        self.heap.pop().map(|entry| (entry.key, entry.item))
    }

    pub fn peek_key(&self) -> Option<OpenKey> {
        self.heap.peek().map(|entry| entry.key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
