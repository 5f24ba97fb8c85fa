use bevy::math::URect;

use super::{Tile, TileFlags};

pub type TileId = u16;

/// Built-in tile type ids, registered by [`TileRegistry::default`] in this order.
pub mod tile_ids {
    use super::TileId;

    pub const AIR: TileId = 0;
    pub const GRASS: TileId = 1;
    pub const DIRT: TileId = 2;
    pub const SAND: TileId = 3;
    pub const WATER: TileId = 4;
    pub const STONE: TileId = 5;
    pub const TREE: TileId = 6;
}

/// Side length of one tile sprite in the atlas, in pixels.
const SPRITE_SIZE: u32 = 16;

/// Static description of a tile type.
#[derive(Clone, Debug, PartialEq)]
pub struct TileInfo {
    pub name: &'static str,
    pub collision: bool,
    pub liquid: bool,
    /// Multiplier on step cost when entering a tile of this type. Never below 1.
    pub movement_cost: u16,
    /// Sprite location in the tile atlas.
    pub sprite_rect: URect,
}

/// Read-only lookup from tile id to [`TileInfo`].
#[derive(Clone, Debug)]
pub struct TileRegistry {
    infos: Vec<TileInfo>,
}

impl Default for TileRegistry {
    fn default() -> Self {
        let mut registry = Self { infos: Vec::new() };
        registry.register("air", false, false, 1);
        registry.register("grass", false, false, 1);
        registry.register("dirt", false, false, 1);
        registry.register("sand", false, false, 2);
        registry.register("water", false, true, 4);
        registry.register("stone", true, false, 1);
        registry.register("tree", true, false, 1);
        registry
    }
}

impl TileRegistry {
    /// Register a tile type; ids are assigned sequentially.
    pub fn register(&mut self, name: &'static str, collision: bool, liquid: bool, movement_cost: u16) -> TileId {
        let id = self.infos.len() as TileId;
        let x = id as u32 * SPRITE_SIZE;
        self.infos.push(TileInfo {
            name,
            collision,
            liquid,
            movement_cost: movement_cost.max(1),
            sprite_rect: URect::new(x, 0, x + SPRITE_SIZE, SPRITE_SIZE),
        });
        id
    }

    pub fn get(&self, id: TileId) -> Option<&TileInfo> {
        self.infos.get(id as usize)
    }

    /// Info for `id`; unknown ids resolve to air.
    #[inline]
    pub fn info(&self, id: TileId) -> &TileInfo {
        debug_assert!((id as usize) < self.infos.len(), "unknown tile id {}", id);
        self.infos.get(id as usize).unwrap_or(&self.infos[tile_ids::AIR as usize])
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Flags implied by a background/foreground pair.
    pub fn flags_for(&self, background: TileId, foreground: TileId) -> TileFlags {
        let bg = self.info(background);
        let fg = self.info(foreground);
        let mut flags = TileFlags::NONE;
        if bg.collision || fg.collision {
            flags.insert(TileFlags::COLLISION);
        }
        if bg.liquid || fg.liquid {
            flags.insert(TileFlags::LIQUID);
        }
        flags
    }

    /// Movement cost of a tile: the more expensive of its two layers.
    #[inline]
    pub fn movement_cost(&self, tile: &Tile) -> u32 {
        let bg = self.info(tile.background_id).movement_cost;
        let fg = self.info(tile.foreground_id).movement_cost;
        bg.max(fg) as u32
    }
}
