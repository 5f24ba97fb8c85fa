use bevy::prelude::*;

pub mod collections;
pub mod config;
pub mod math;
pub mod pathfinding;
pub mod tiles;
pub mod viewer;
pub mod world;

use config::GameConfigPlugin;
use pathfinding::PathfindingPlugin;
use viewer::ViewerPlugin;
use world::WorldPlugin;

/// Everything except windowing and rendering setup.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameConfigPlugin, WorldPlugin, PathfindingPlugin, ViewerPlugin))
            .add_systems(Startup, log_startup);
    }
}

fn log_startup(config: Res<config::WorldConfig>) {
    info!(
        "Game setup: chunk {} tiles, {} divisions, view distance {} chunks, seed {}",
        config.chunk_size, config.divisions, config.view_distance_chunks, config.seed
    );
}
