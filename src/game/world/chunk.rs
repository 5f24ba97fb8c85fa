use bevy::math::{IRect, IVec2, Vec2};

use crate::game::math::GridLayout;
use crate::game::tiles::{TileGrid, TileRegistry};

/// Pending refresh on one chunk axis (render bake or region update).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefreshState {
    /// Nothing to do.
    #[default]
    None,
    /// This chunk needs a refresh.
    SelfOnly,
    /// This chunk needs a refresh, and its four cardinal neighbours must be flagged too.
    SelfAndNeighbors,
}

impl RefreshState {
    #[inline]
    pub fn is_pending(self) -> bool {
        self != RefreshState::None
    }

    /// Flag a neighbour. Only chunks with nothing scheduled receive the flag, so a
    /// stronger pending refresh is never downgraded.
    #[inline]
    pub fn propagate(&mut self) {
        if *self == RefreshState::None {
            *self = RefreshState::SelfOnly;
        }
    }
}

/// Drives re-rendering of a chunk's texture.
pub type BakeState = RefreshState;
/// Drives rebuilding of a chunk's region graph.
pub type UpdateState = RefreshState;

/// A square block of tiles. Lives in the chunk pool for the whole session; a pooled
/// chunk is inert (`is_loaded == false`) until it is assigned a coordinate.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: IVec2,
    pub tiles: TileGrid,
    /// Inclusive tile bounds.
    pub bounding_box: IRect,
    /// Centre in tile space, used for view-distance checks.
    pub center_position: Vec2,
    pub bake_state: BakeState,
    pub update_state: UpdateState,
    pub is_loaded: bool,
}

impl Chunk {
    pub(crate) fn pooled(chunk_size: i32) -> Self {
        Self {
            coord: IVec2::ZERO,
            tiles: TileGrid::new(chunk_size),
            bounding_box: IRect::default(),
            center_position: Vec2::ZERO,
            bake_state: BakeState::None,
            update_state: UpdateState::None,
            is_loaded: false,
        }
    }

    /// Take ownership of freshly generated tiles. The chunk's previous tile buffer is
    /// left in `tiles` so the caller can recycle it.
    pub(crate) fn assign(&mut self, coord: IVec2, layout: &GridLayout, tiles: &mut TileGrid) {
        debug_assert!(!self.is_loaded, "assigning a chunk that is still loaded");
        debug_assert_eq!(tiles.size(), layout.chunk_size);
        std::mem::swap(&mut self.tiles, tiles);
        self.coord = coord;
        self.bounding_box = layout.chunk_bounds(coord);
        self.center_position = layout.chunk_center(coord);
        // Neighbours' border regions look across into this chunk, so they refresh too.
        self.bake_state = BakeState::SelfAndNeighbors;
        self.update_state = UpdateState::SelfAndNeighbors;
        self.is_loaded = true;
    }

    pub(crate) fn return_to_pool(&mut self) {
        self.bake_state = BakeState::None;
        self.update_state = UpdateState::None;
        self.is_loaded = false;
    }

    /// Whether region data derived from this chunk can be trusted.
    #[inline]
    pub fn regions_fresh(&self) -> bool {
        self.is_loaded && !self.update_state.is_pending()
    }
}

/// Render collaborator: produces a chunk's off-screen representation.
///
/// The core only decides *when* a chunk is baked; pixel work happens behind this trait.
pub trait ChunkRenderer {
    fn bake(&mut self, chunk: &Chunk, registry: &TileRegistry);
}

/// Renderer that only records which chunks were baked, for forwarding as messages.
#[derive(Debug, Default)]
pub struct BakeQueue {
    pub baked: Vec<IVec2>,
}

impl ChunkRenderer for BakeQueue {
    fn bake(&mut self, chunk: &Chunk, _registry: &TileRegistry) {
        self.baked.push(chunk.coord);
    }
}
