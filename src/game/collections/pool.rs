//! Fixed-capacity slot pool.
//!
//! # Purpose
//!
//! Own a preallocated set of expensive objects (chunks) and lend them out by integer
//! handle. The pool never grows and never drops a slot: the number of slots equals the
//! capacity given at construction for the pool's whole life.
//!
//! # Architecture
//!
//! - `slots`: the preallocated objects, indexed by [`SlotHandle`]
//! - `free`: stack of free slot indices (LIFO, so recently released slots are reused first)
//! - `in_use`: occupancy bitset for O(1) "is this handle checked out?" checks
//!
//! Releasing a slot that is not checked out is a programmer error and panics.

use fixedbitset::FixedBitSet;

/// Integer handle to a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(u32);

impl SlotHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub struct SlotPool<T> {
    slots: Vec<T>,
    free: Vec<u32>,
    in_use: FixedBitSet,
}

impl<T> SlotPool<T> {
    /// Preallocate `capacity` slots using `make(index)`.
    pub fn new(capacity: usize, mut make: impl FnMut(usize) -> T) -> Self {
        let slots: Vec<T> = (0..capacity).map(&mut make).collect();
        // Reversed so the first acquire hands out slot 0.
        let free: Vec<u32> = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            in_use: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Check out a free slot, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<SlotHandle> {
        let index = self.free.pop()?;
        self.in_use.insert(index as usize);
        Some(SlotHandle(index))
    }

    /// Return a slot to the pool.
    pub fn release(&mut self, handle: SlotHandle) {
        let index = handle.index();
        assert!(
            self.in_use.contains(index),
            "SlotPool: releasing slot {} which is not checked out",
            index
        );
        self.in_use.set(index, false);
        self.free.push(handle.0);
    }

    pub fn is_in_use(&self, handle: SlotHandle) -> bool {
        self.in_use.contains(handle.index())
    }

    pub fn get(&self, handle: SlotHandle) -> &T {
        &self.slots[handle.index()]
    }

    pub fn get_mut(&mut self, handle: SlotHandle) -> &mut T {
        &mut self.slots[handle.index()]
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.count_ones(..)
    }

    /// Checked-out slots in index order.
    pub fn iter_in_use(&self) -> impl Iterator<Item = (SlotHandle, &T)> + '_ {
        self.in_use
            .ones()
            .map(move |index| (SlotHandle(index as u32), &self.slots[index]))
    }
}
