use bevy::math::IVec2;
use rustc_hash::FxHashMap;

use crate::game::collections::SlotHandle;

/// Authoritative mapping from chunk coordinate to the pool slot holding that chunk.
///
/// Mutable lookups go through a single-entry last-access cache: consecutive queries for
/// the same chunk (the common case when walking tiles) skip the hash lookup. Shared
/// readers get the same behaviour through [`ChunkCursor`], which carries its own cache
/// so `&ChunkMap` stays freely shareable.
#[derive(Debug, Default)]
pub struct ChunkMap {
    map: FxHashMap<IVec2, SlotHandle>,
    last: Option<(IVec2, SlotHandle)>,
}

impl ChunkMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, coord: IVec2) -> bool {
        self.map.contains_key(&coord)
    }

    pub fn get(&self, coord: IVec2) -> Option<SlotHandle> {
        if let Some((cached, handle)) = self.last {
            if cached == coord {
                return Some(handle);
            }
        }
        self.map.get(&coord).copied()
    }

    /// Lookup that refreshes the last-access cache.
    pub fn lookup(&mut self, coord: IVec2) -> Option<SlotHandle> {
        if let Some((cached, handle)) = self.last {
            if cached == coord {
                return Some(handle);
            }
        }
        let handle = self.map.get(&coord).copied()?;
        self.last = Some((coord, handle));
        Some(handle)
    }

    /// Insert a chunk. Returns the previous handle if the coordinate was already mapped.
    pub fn insert(&mut self, coord: IVec2, handle: SlotHandle) -> Option<SlotHandle> {
        if matches!(self.last, Some((cached, _)) if cached == coord) {
            self.last = None;
        }
        self.map.insert(coord, handle)
    }

    pub fn remove(&mut self, coord: IVec2) -> Option<SlotHandle> {
        if matches!(self.last, Some((cached, _)) if cached == coord) {
            self.last = None;
        }
        self.map.remove(&coord)
    }

    /// Resident coordinates, sorted so callers iterate deterministically.
    pub fn sorted_coords(&self) -> Vec<IVec2> {
        let mut coords: Vec<IVec2> = self.map.keys().copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        coords
    }

    pub fn cursor(&self) -> ChunkCursor<'_> {
        ChunkCursor { map: self, last: self.last }
    }
}

/// Read-only view over a [`ChunkMap`] with a private last-access cache.
#[derive(Clone, Copy)]
pub struct ChunkCursor<'a> {
    map: &'a ChunkMap,
    last: Option<(IVec2, SlotHandle)>,
}

impl ChunkCursor<'_> {
    #[inline]
    pub fn get(&mut self, coord: IVec2) -> Option<SlotHandle> {
        if let Some((cached, handle)) = self.last {
            if cached == coord {
                return Some(handle);
            }
        }
        let handle = self.map.map.get(&coord).copied()?;
        self.last = Some((coord, handle));
        Some(handle)
    }
}
