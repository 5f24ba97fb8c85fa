use bevy::math::IVec2;
use noise::{NoiseFn, Perlin};

use crate::game::config::WorldConfig;
use crate::game::math::GridLayout;
use crate::game::tiles::{tile_ids, Tile, TileGrid, TileRegistry};

/// Deterministic terrain oracle. The same seed and tile coordinate always yield the
/// same tile, so a chunk regenerated after an unload matches its first load.
#[derive(Clone)]
pub struct TerrainGenerator {
    elevation: Perlin,
    detail: Perlin,
    noise_scale: f64,
    detail_scale: f64,
    water_level: f64,
    sand_margin: f64,
    rock_level: f64,
    tree_threshold: f64,
}

impl TerrainGenerator {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            elevation: Perlin::new(config.seed),
            detail: Perlin::new(config.seed.wrapping_add(1)),
            noise_scale: config.noise_scale,
            detail_scale: config.detail_scale,
            water_level: config.water_level,
            sand_margin: config.sand_margin,
            rock_level: config.rock_level,
            tree_threshold: config.tree_threshold,
        }
    }

    /// Elevation noise in roughly `[-1, 1]`.
    pub fn sample(&self, x: i32, y: i32) -> f64 {
        self.elevation
            .get([x as f64 * self.noise_scale, y as f64 * self.noise_scale])
    }

    pub fn tile_at(&self, pos: IVec2, registry: &TileRegistry) -> Tile {
        let elevation = self.sample(pos.x, pos.y);
        let (background, foreground) = if elevation < self.water_level {
            (tile_ids::WATER, tile_ids::AIR)
        } else if elevation < self.water_level + self.sand_margin {
            (tile_ids::SAND, tile_ids::AIR)
        } else if elevation > self.rock_level {
            (tile_ids::DIRT, tile_ids::STONE)
        } else {
            let detail = self
                .detail
                .get([pos.x as f64 * self.detail_scale, pos.y as f64 * self.detail_scale]);
            if detail > self.tree_threshold {
                (tile_ids::GRASS, tile_ids::TREE)
            } else {
                (tile_ids::GRASS, tile_ids::AIR)
            }
        };
        Tile::new(background, foreground, registry)
    }

    /// Generate every tile of chunk `coord` into `grid`.
    pub fn fill_chunk(&self, coord: IVec2, layout: &GridLayout, registry: &TileRegistry, grid: &mut TileGrid) {
        debug_assert_eq!(grid.size(), layout.chunk_size);
        let origin = layout.chunk_origin(coord);
        for y in 0..layout.chunk_size {
            for x in 0..layout.chunk_size {
                let local = IVec2::new(x, y);
                grid.set(local, self.tile_at(origin + local, registry));
            }
        }
    }
}
