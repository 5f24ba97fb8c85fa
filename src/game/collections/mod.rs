//! Generic scratch and storage structures shared by the world and the pathfinders.
//!
//! Hash maps/sets come from `rustc_hash` (`FxHashMap`/`FxHashSet`) and growable
//! arrays from `Vec`/`SmallVec`; this module only holds the pieces those don't cover:
//!
//! - [`OpenHeap`]: binary min-heap keyed by `(f_cost, h_cost)` for A* open sets
//! - [`NodeArena`]: per-search node storage invalidated wholesale by a generation bump
//! - [`SlotPool`]: fixed-capacity free list over a preallocated array, addressed by handle
//!
//! All three are long-lived scratch: they are cleared between uses, never reallocated.

pub mod arena;
pub mod heap;
pub mod pool;


pub use arena::{NodeArena, NodeHandle};
pub use heap::{compare_open, OpenHeap, OpenKey};
pub use pool::{SlotHandle, SlotPool};
