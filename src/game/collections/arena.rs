//! Generation-checked node arena.
//!
//! Search nodes are never freed one by one. A search allocates as many as it needs,
//! then [`NodeArena::reset`] drops them all and bumps the generation so any handle
//! that escaped the search resolves to `None` instead of a recycled node.

/// Handle to a node allocated in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug)]
pub struct NodeArena<T> {
    nodes: Vec<T>,
    generation: u32,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> NodeArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Invalidate every node. Keeps the backing allocation.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn alloc(&mut self, node: T) -> NodeHandle {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeHandle {
            index,
            generation: self.generation,
        }
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        if handle.generation != self.generation {
            return None;
        }
        self.nodes.get(handle.index as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}
