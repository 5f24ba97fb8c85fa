mod astar;
mod region;
mod region_extraction;
mod region_search;
mod systems;
mod types;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use astar::TilePathfinder;
pub use region::{Portal, PortalLink, Region, RegionMap};
pub use region_extraction::{extract_chunk_regions, side_probe_order};
pub use region_search::{Pathfinder, RegionPathfinder};
pub use systems::MoveRequest;
pub use types::{MovePath, PathError, RegionDirection, RegionHop, RegionPath, RouteStep, Side, TilePath};

use bevy::prelude::*;

use crate::game::world::{refresh_dirty_chunks, TileWorld};

pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MoveRequest>();
        app.add_systems(
            Update,
            (systems::replan_stale_routes, systems::process_move_requests)
                .chain()
                .after(refresh_dirty_chunks)
                .run_if(resource_exists::<TileWorld>.and(resource_exists::<Pathfinder>)),
        );
    }
}
