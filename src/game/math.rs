//! Integer tile-space math: coordinate conversions between tiles, chunks and regions.
//!
//! All conversions use floor division (`div_euclid`) so negative coordinates land in
//! the correct chunk/region: tile `-1` belongs to chunk `-1`, not chunk `0`.

use bevy::math::{IRect, IVec2, Vec2};

/// Cost of one orthogonal step on a tile with movement cost 1.
pub const STRAIGHT_STEP_COST: u32 = 10;

/// Cost of one diagonal step on a tile with movement cost 1.
pub const DIAGONAL_STEP_COST: u32 = 14;

/// Layout of the tile world: how tiles group into chunks, and chunks into regions.
///
/// A chunk is `chunk_size × chunk_size` tiles. Each chunk is partitioned into
/// `divisions × divisions` regions of `region_size()` tiles per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub chunk_size: i32,
    pub divisions: i32,
}

impl GridLayout {
    /// Panics on a zero-sized layout or a chunk size the divisions do not split evenly;
    /// both are configuration bugs, not runtime conditions.
    pub fn new(chunk_size: i32, divisions: i32) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive, got {}", chunk_size);
        assert!(divisions > 0, "divisions must be positive, got {}", divisions);
        assert!(
            chunk_size % divisions == 0,
            "chunk_size {} is not divisible by divisions {}",
            chunk_size,
            divisions
        );
        Self { chunk_size, divisions }
    }

    #[inline]
    pub fn region_size(&self) -> i32 {
        self.chunk_size / self.divisions
    }

    /// Number of tiles in one chunk.
    #[inline]
    pub fn chunk_area(&self) -> usize {
        (self.chunk_size * self.chunk_size) as usize
    }

    #[inline]
    pub fn tile_to_chunk(&self, tile: IVec2) -> IVec2 {
        tile.div_euclid(IVec2::splat(self.chunk_size))
    }

    /// Position of a tile relative to its chunk's origin, in `0..chunk_size`.
    #[inline]
    pub fn tile_to_local(&self, tile: IVec2) -> IVec2 {
        tile.rem_euclid(IVec2::splat(self.chunk_size))
    }

    /// Row-major index of a chunk-local position.
    #[inline]
    pub fn local_index(&self, local: IVec2) -> usize {
        debug_assert!(local.x >= 0 && local.x < self.chunk_size);
        debug_assert!(local.y >= 0 && local.y < self.chunk_size);
        (local.y * self.chunk_size + local.x) as usize
    }

    #[inline]
    pub fn chunk_origin(&self, chunk: IVec2) -> IVec2 {
        chunk * self.chunk_size
    }

    /// Inclusive tile bounds of a chunk.
    pub fn chunk_bounds(&self, chunk: IVec2) -> IRect {
        let min = self.chunk_origin(chunk);
        IRect::from_corners(min, min + IVec2::splat(self.chunk_size - 1))
    }

    /// Centre of a chunk in tile space (tile `(0,0)` covers `[0,1)²`).
    pub fn chunk_center(&self, chunk: IVec2) -> Vec2 {
        self.chunk_origin(chunk).as_vec2() + Vec2::splat(self.chunk_size as f32 * 0.5)
    }

    #[inline]
    pub fn tile_to_region(&self, tile: IVec2) -> IVec2 {
        tile.div_euclid(IVec2::splat(self.region_size()))
    }

    #[inline]
    pub fn region_origin(&self, region: IVec2) -> IVec2 {
        region * self.region_size()
    }

    /// Inclusive tile bounds of a region.
    pub fn region_bounds(&self, region: IVec2) -> IRect {
        let min = self.region_origin(region);
        IRect::from_corners(min, min + IVec2::splat(self.region_size() - 1))
    }

    #[inline]
    pub fn region_to_chunk(&self, region: IVec2) -> IVec2 {
        region.div_euclid(IVec2::splat(self.divisions))
    }

    /// All region coordinates of a chunk, row-major from the chunk's lowest corner.
    pub fn chunk_regions(&self, chunk: IVec2) -> impl Iterator<Item = IVec2> {
        let base = chunk * self.divisions;
        let divisions = self.divisions;
        (0..divisions).flat_map(move |y| (0..divisions).map(move |x| base + IVec2::new(x, y)))
    }
}

/// Octile distance estimate scaled ×10: `10*(dx+dy) + (14-20)*min(dx,dy)`.
///
/// Admissible for step costs of 10 (straight) and 14 (diagonal) on tiles whose
/// movement cost is at least 1.
#[inline]
pub fn octile_distance(a: IVec2, b: IVec2) -> u32 {
    let delta = (a - b).abs();
    let (dx, dy) = (delta.x as u32, delta.y as u32);
    STRAIGHT_STEP_COST * (dx + dy) - (2 * STRAIGHT_STEP_COST - DIAGONAL_STEP_COST) * dx.min(dy)
}

/// The four cardinal neighbour offsets (north = +y).
pub const CARDINAL_OFFSETS: [IVec2; 4] = [IVec2::Y, IVec2::NEG_Y, IVec2::X, IVec2::NEG_X];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_tiles_floor_into_chunks() {
        let layout = GridLayout::new(32, 4);
        assert_eq!(layout.tile_to_chunk(IVec2::new(-1, 0)), IVec2::new(-1, 0));
        assert_eq!(layout.tile_to_chunk(IVec2::new(31, 32)), IVec2::new(0, 1));
        assert_eq!(layout.tile_to_local(IVec2::new(-1, -33)), IVec2::new(31, 31));
        assert_eq!(layout.tile_to_region(IVec2::new(-1, 9)), IVec2::new(-1, 1));
        assert_eq!(layout.region_to_chunk(IVec2::new(-1, 4)), IVec2::new(-1, 1));
    }

    #[test]
    fn test_chunk_regions_cover_chunk() {
        let layout = GridLayout::new(16, 2);
        let regions: Vec<_> = layout.chunk_regions(IVec2::new(1, -1)).collect();
        assert_eq!(regions, vec![
            IVec2::new(2, -2), IVec2::new(3, -2),
            IVec2::new(2, -1), IVec2::new(3, -1),
        ]);
        for region in regions {
            assert_eq!(layout.region_to_chunk(region), IVec2::new(1, -1));
        }
    }

    #[test]
    fn test_octile_distance() {
        assert_eq!(octile_distance(IVec2::ZERO, IVec2::ZERO), 0);
        assert_eq!(octile_distance(IVec2::ZERO, IVec2::new(3, 0)), 30);
        assert_eq!(octile_distance(IVec2::ZERO, IVec2::new(2, 2)), 28);
        assert_eq!(octile_distance(IVec2::new(-1, 4), IVec2::new(2, 0)), 14 * 3 + 10);
    }

    #[test]
    #[should_panic]
    fn test_indivisible_layout_panics() {
        GridLayout::new(30, 4);
    }
}
