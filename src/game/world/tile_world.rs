use bevy::prelude::*;

use crate::game::collections::SlotPool;
use crate::game::config::WorldConfig;
use crate::game::math::{GridLayout, CARDINAL_OFFSETS};
use crate::game::pathfinding::{extract_chunk_regions, Region, RegionMap, TilePathfinder};
use crate::game::tiles::{Tile, TileGrid, TileRegistry};

use super::chunk::{Chunk, ChunkRenderer, RefreshState};
use super::chunk_map::{ChunkCursor, ChunkMap};

/// The tile world context: chunk pool, resident chunk map, and region map.
///
/// Every core operation goes through this struct; there is no global world state, so
/// independent worlds (tests, tools) can coexist. Owned by the main thread. The chunk
/// loader thread never sees it, only coordinate snapshots.
#[derive(Resource)]
pub struct TileWorld {
    config: WorldConfig,
    layout: GridLayout,
    registry: TileRegistry,
    pool: SlotPool<Chunk>,
    chunks: ChunkMap,
    regions: RegionMap,
}

/// What one pass of [`TileWorld::process_dirty_chunks`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirtyWalk {
    pub baked: usize,
    /// Chunks whose regions were re-extracted, in walk order.
    pub rebuilt: Vec<IVec2>,
}

impl TileWorld {
    /// Panics on an invalid config: a world that cannot be laid out is a setup bug.
    pub fn new(config: WorldConfig, registry: TileRegistry) -> Self {
        if let Err(e) = config.validate() {
            panic!("TileWorld::new: {}", e);
        }
        let layout = config.layout();
        let capacity = config.total_chunks();
        let chunk_size = layout.chunk_size;
        info!(
            "[CHUNKS] World created: {}x{} chunks, {} divisions, pool of {} chunks",
            chunk_size, chunk_size, layout.divisions, capacity
        );
        Self {
            pool: SlotPool::new(capacity, |_| Chunk::pooled(chunk_size)),
            chunks: ChunkMap::with_capacity(capacity),
            regions: RegionMap::new(layout),
            config,
            layout,
            registry,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn chunk(&self, coord: IVec2) -> Option<&Chunk> {
        self.chunks.get(coord).map(|handle| self.pool.get(handle))
    }

    pub fn is_resident(&self, coord: IVec2) -> bool {
        self.chunks.contains(coord)
    }

    pub fn tile(&self, pos: IVec2) -> Option<&Tile> {
        let chunk = self.chunk(self.layout.tile_to_chunk(pos))?;
        chunk.tiles.get(self.layout.tile_to_local(pos))
    }

    /// Cached tile reader for hot loops that walk neighbouring tiles.
    pub fn cursor(&self) -> TileCursor<'_> {
        TileCursor {
            world: self,
            chunks: self.chunks.cursor(),
        }
    }

    /// Region data for `region`, or `None` if it is missing or its chunk awaits a rebuild.
    pub fn fresh_region(&self, region: IVec2) -> Option<&Region> {
        self.regions.get_fresh(region, self)
    }

    /// True while `region`'s chunk is resident but its regions are queued for a rebuild.
    pub fn region_pending(&self, region: IVec2) -> bool {
        self.chunk(self.layout.region_to_chunk(region))
            .is_some_and(|chunk| !chunk.regions_fresh())
    }

    /// Resident chunk coordinates, sorted by `(y, x)`.
    pub fn resident_coords(&self) -> Vec<IVec2> {
        self.chunks.sorted_coords()
    }

    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.free_count()
    }

    pub fn total_chunks(&self) -> usize {
        self.pool.capacity()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Overwrite a tile and schedule a re-bake and region rebuild of its chunk and the
    /// chunk's neighbours. Panics if the tile's chunk is not resident.
    pub fn set_tile(&mut self, pos: IVec2, tile: Tile) {
        let coord = self.layout.tile_to_chunk(pos);
        let local = self.layout.tile_to_local(pos);
        let Some(handle) = self.chunks.lookup(coord) else {
            panic!("set_tile: tile {} is in chunk {} which is not resident", pos, coord);
        };
        let chunk = self.pool.get_mut(handle);
        chunk.tiles.set(local, tile);
        chunk.bake_state = RefreshState::SelfAndNeighbors;
        chunk.update_state = RefreshState::SelfAndNeighbors;
    }

    /// Make `coord` resident using freshly generated `tiles`. On success the chunk's
    /// previous buffer is swapped into `tiles` for recycling.
    ///
    /// Returns false when `coord` is already resident or the pool is exhausted. Pool
    /// exhaustion is backpressure: the load is retried on a later scan.
    pub fn load_chunk(&mut self, coord: IVec2, tiles: &mut TileGrid) -> bool {
        if self.chunks.contains(coord) {
            return false;
        }
        let Some(handle) = self.pool.acquire() else {
            debug!("[CHUNKS] Pool exhausted, deferring load of {}", coord);
            return false;
        };
        self.pool.get_mut(handle).assign(coord, &self.layout, tiles);
        self.chunks.insert(coord, handle);
        true
    }

    /// Return a resident chunk to the pool and drop its regions. Resident neighbours
    /// get a region rebuild, since their border crossings looked into this chunk.
    pub fn unload_chunk(&mut self, coord: IVec2) -> bool {
        let Some(handle) = self.chunks.remove(coord) else {
            return false;
        };
        self.pool.get_mut(handle).return_to_pool();
        self.pool.release(handle);
        self.regions.remove_chunk(coord);

        for offset in CARDINAL_OFFSETS {
            if let Some(neighbor) = self.chunks.lookup(coord + offset) {
                self.pool.get_mut(neighbor).update_state.propagate();
            }
        }
        true
    }

    fn propagate_to_neighbors(&mut self, coord: IVec2, bake: bool, update: bool) {
        for offset in CARDINAL_OFFSETS {
            let Some(handle) = self.chunks.lookup(coord + offset) else {
                continue;
            };
            let neighbor = self.pool.get_mut(handle);
            if bake {
                neighbor.bake_state.propagate();
            }
            if update {
                neighbor.update_state.propagate();
            }
        }
    }

    /// The per-tick chunk walk: bake chunks flagged for rendering, rebuild regions of
    /// chunks flagged for update, clear both flags, and pass `SelfAndNeighbors` on to
    /// the cardinal neighbours.
    pub fn process_dirty_chunks(
        &mut self,
        pathfinder: &mut TilePathfinder,
        renderer: &mut dyn ChunkRenderer,
    ) -> DirtyWalk {
        let mut walk = DirtyWalk::default();

        for coord in self.resident_coords() {
            let Some(handle) = self.chunks.lookup(coord) else {
                continue;
            };
            let (bake, update) = {
                let chunk = self.pool.get(handle);
                (chunk.bake_state, chunk.update_state)
            };

            if bake.is_pending() {
                renderer.bake(self.pool.get(handle), &self.registry);
                self.pool.get_mut(handle).bake_state = RefreshState::None;
                walk.baked += 1;
            }

            if update.is_pending() {
                let regions = extract_chunk_regions(&*self, coord, pathfinder);
                self.regions.replace(regions);
                self.pool.get_mut(handle).update_state = RefreshState::None;
                walk.rebuilt.push(coord);
            }

            let bake_spreads = bake == RefreshState::SelfAndNeighbors;
            let update_spreads = update == RefreshState::SelfAndNeighbors;
            if bake_spreads || update_spreads {
                self.propagate_to_neighbors(coord, bake_spreads, update_spreads);
            }
        }

        if !walk.rebuilt.is_empty() {
            debug!("[REGIONS] Rebuilt regions for {} chunks", walk.rebuilt.len());
        }
        walk
    }
}

/// Tile reader over a [`TileWorld`] that remembers the last chunk it touched.
///
/// Tiles in chunks that are not resident read as `None` and are never walkable.
#[derive(Clone, Copy)]
pub struct TileCursor<'a> {
    world: &'a TileWorld,
    chunks: ChunkCursor<'a>,
}

impl<'a> TileCursor<'a> {
    #[inline]
    pub fn tile(&mut self, pos: IVec2) -> Option<&'a Tile> {
        let layout = &self.world.layout;
        let handle = self.chunks.get(layout.tile_to_chunk(pos))?;
        self.world.pool.get(handle).tiles.get(layout.tile_to_local(pos))
    }

    #[inline]
    pub fn is_walkable(&mut self, pos: IVec2) -> bool {
        self.tile(pos).is_some_and(|tile| !tile.is_collision())
    }

    /// Movement cost multiplier of a walkable tile; `None` if blocked or not resident.
    #[inline]
    pub fn movement_cost(&mut self, pos: IVec2) -> Option<u32> {
        let registry = &self.world.registry;
        self.tile(pos)
            .filter(|tile| !tile.is_collision())
            .map(|tile| registry.movement_cost(tile))
    }
}
