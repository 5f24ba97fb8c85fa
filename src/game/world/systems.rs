use bevy::prelude::*;
use std::time::Duration;

use crate::game::config::WorldConfig;
use crate::game::pathfinding::Pathfinder;
use crate::game::tiles::TileRegistry;
use crate::profile_log;

use super::chunk::BakeQueue;
use super::loader::ChunkLoader;
use super::streamer::ChunkStreamer;
use super::tile_world::TileWorld;

/// Startup prefill gives up after this long and lets streaming catch up per tick.
const PREFILL_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Components, resources, messages
// ============================================================================

/// Marks the entity chunks stream around. The first viewer found wins.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ChunkViewer;

/// Position of an entity in tile space.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TilePosition(pub IVec2);

/// Streaming tick counter.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct WorldTick(pub u64);

#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLoaded {
    pub coord: IVec2,
}

#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkUnloaded {
    pub coord: IVec2,
}

/// A chunk's render representation must be redrawn.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBakeRequested {
    pub coord: IVec2,
}

// ============================================================================
// Systems
// ============================================================================

/// Build the world, start the loader thread and stream in the chunks around the origin.
pub fn setup_tile_world(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut loaded: MessageWriter<ChunkLoaded>,
) {
    let registry = TileRegistry::default();
    let mut world = TileWorld::new(config.clone(), registry.clone());

    match ChunkLoader::spawn(&config, registry) {
        Ok(loader) => {
            let mut streamer = ChunkStreamer::new(loader);
            let diff = streamer.prefill_blocking(&mut world, PREFILL_TIMEOUT);
            for coord in diff.loaded {
                loaded.write(ChunkLoaded { coord });
            }
            commands.insert_resource(streamer);
        }
        Err(e) => {
            error!("[LOADER] Failed to start chunk loader thread: {}", e);
        }
    }

    commands.insert_resource(Pathfinder::new(&config));
    commands.insert_resource(world);
}

pub fn stream_chunks(
    viewers: Query<&TilePosition, With<ChunkViewer>>,
    streamer: Option<ResMut<ChunkStreamer>>,
    mut world: ResMut<TileWorld>,
    mut tick: ResMut<WorldTick>,
    mut loaded: MessageWriter<ChunkLoaded>,
    mut unloaded: MessageWriter<ChunkUnloaded>,
) {
    tick.0 += 1;
    let Some(mut streamer) = streamer else {
        return;
    };
    if let Some(viewer) = viewers.iter().next() {
        streamer.set_target(viewer.0);
    }

    let diff = streamer.update(&mut world);
    for coord in diff.unloaded {
        unloaded.write(ChunkUnloaded { coord });
    }
    for coord in diff.loaded {
        loaded.write(ChunkLoaded { coord });
    }

    profile_log!(
        tick,
        "[CHUNKS] tick {}: {} resident, {} pooled, stats {:?}",
        tick.0,
        world.resident_count(),
        world.pooled_count(),
        streamer.stats()
    );
}

/// The per-tick dirty walk. Bakes become [`ChunkBakeRequested`] messages for whatever
/// renders chunks.
pub fn refresh_dirty_chunks(
    mut world: ResMut<TileWorld>,
    mut pathfinder: ResMut<Pathfinder>,
    mut bakes: MessageWriter<ChunkBakeRequested>,
) {
    let mut queue = BakeQueue::default();
    world.process_dirty_chunks(&mut pathfinder.tiles, &mut queue);
    for coord in queue.baked {
        bakes.write(ChunkBakeRequested { coord });
    }
}
