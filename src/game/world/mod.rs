//! The chunked tile world: chunk pool, resident map, background streaming, and the
//! per-tick bake/region refresh walk.

mod chunk;
mod chunk_map;
mod generation;
mod loader;
mod streamer;
mod systems;
mod tile_world;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use chunk::{BakeQueue, BakeState, Chunk, ChunkRenderer, RefreshState, UpdateState};
pub use chunk_map::{ChunkCursor, ChunkMap};
pub use generation::TerrainGenerator;
pub use loader::{plan_scan, ChunkLoader, GeneratedChunk, LoaderBatch, LoaderCommand, ScanPlan, ScanSettings};
pub use streamer::{ChunkDiff, ChunkStreamer, StreamingStats};
pub use systems::{
    refresh_dirty_chunks, setup_tile_world, stream_chunks, ChunkBakeRequested, ChunkLoaded, ChunkUnloaded,
    ChunkViewer, TilePosition, WorldTick,
};
pub use tile_world::{DirtyWalk, TileCursor, TileWorld};

use bevy::prelude::*;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ChunkLoaded>();
        app.add_message::<ChunkUnloaded>();
        app.add_message::<ChunkBakeRequested>();
        app.init_resource::<WorldTick>();
        app.add_systems(Startup, setup_tile_world);
        app.add_systems(
            Update,
            (stream_chunks, refresh_dirty_chunks)
                .chain()
                .run_if(resource_exists::<TileWorld>),
        );
    }
}
