//! Tile data: per-tile flags, the fixed-size per-chunk tile grid, and the tile-type registry.

pub mod registry;

pub use registry::{tile_ids, TileId, TileInfo, TileRegistry};

use bevy::math::IVec2;
use serde::{Deserialize, Serialize};

/// 8-bit tile flag set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFlags(pub u8);

impl TileFlags {
    pub const NONE: Self = Self(0);
    /// Agents cannot enter this tile.
    pub const COLLISION: Self = Self(1 << 0);
    pub const LIQUID: Self = Self(1 << 1);
    /// Not revealed to the player yet. Does not affect pathing.
    pub const HIDDEN: Self = Self(1 << 2);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for TileFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// One world tile. Owned by exactly one chunk and mutated in place when terrain changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub background_id: TileId,
    pub foreground_id: TileId,
    pub flags: TileFlags,
}

impl Tile {
    /// Build a tile whose collision/liquid flags are derived from the registry.
    pub fn new(background_id: TileId, foreground_id: TileId, registry: &TileRegistry) -> Self {
        Self {
            background_id,
            foreground_id,
            flags: registry.flags_for(background_id, foreground_id),
        }
    }

    #[inline]
    pub fn is_collision(&self) -> bool {
        self.flags.contains(TileFlags::COLLISION)
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.flags.contains(TileFlags::LIQUID)
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(TileFlags::HIDDEN)
    }
}

/// Square tile array of one chunk, row-major from the chunk's lowest corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    size: i32,
    tiles: Box<[Tile]>,
}

impl TileGrid {
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "TileGrid size must be positive, got {}", size);
        Self {
            size,
            tiles: vec![Tile::default(); (size * size) as usize].into_boxed_slice(),
        }
    }

    pub fn filled(size: i32, tile: Tile) -> Self {
        let mut grid = Self::new(size);
        grid.fill(tile);
        grid
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    fn index(&self, local: IVec2) -> Option<usize> {
        if local.x < 0 || local.y < 0 || local.x >= self.size || local.y >= self.size {
            return None;
        }
        Some((local.y * self.size + local.x) as usize)
    }

    #[inline]
    pub fn get(&self, local: IVec2) -> Option<&Tile> {
        self.index(local).map(|i| &self.tiles[i])
    }

    #[inline]
    pub fn get_mut(&mut self, local: IVec2) -> Option<&mut Tile> {
        self.index(local).map(move |i| &mut self.tiles[i])
    }

    /// Overwrite one tile. Returns false if `local` is outside the grid.
    pub fn set(&mut self, local: IVec2, tile: Tile) -> bool {
        match self.get_mut(local) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// `(local position, tile)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Tile)> + '_ {
        let size = self.size;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (IVec2::new(i as i32 % size, i as i32 / size), tile))
    }
}
