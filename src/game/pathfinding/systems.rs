use bevy::prelude::*;

use crate::game::world::{TilePosition, TileWorld};

use super::region_search::Pathfinder;
use super::types::{MovePath, PathError};

/// Ask for `entity` to be routed from `start` to `goal`. On success the entity gets a
/// [`MovePath`]; on failure any previous path is removed and the entity stays put.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct MoveRequest {
    pub entity: Entity,
    pub start: IVec2,
    pub goal: IVec2,
}

pub(super) fn process_move_requests(
    mut requests: MessageReader<MoveRequest>,
    mut commands: Commands,
    world: Res<TileWorld>,
    mut pathfinder: ResMut<Pathfinder>,
) {
    if requests.is_empty() {
        return;
    }

    let start_time = std::time::Instant::now();
    let request_count = requests.len();
    if request_count > 10 {
        warn!("[PATHFINDING] High move request count: {} pending requests!", request_count);
    }

    for request in requests.read() {
        let Ok(mut entity) = commands.get_entity(request.entity) else {
            continue;
        };
        match pathfinder.find_route(&world, request.start, request.goal) {
            Ok(path) => {
                entity.insert(path);
            }
            Err(e) => {
                log_failure(request.start, request.goal, e);
                entity.remove::<MovePath>();
            }
        }
    }

    let total_duration = start_time.elapsed();
    if total_duration.as_millis() > 100 {
        warn!(
            "[PATHFINDING] Slow batch processing: {:?} for {} requests",
            total_duration, request_count
        );
    }
}

/// Re-plan routes whose regions were unloaded or rebuilt since they were planned.
pub(super) fn replan_stale_routes(
    mut commands: Commands,
    world: Res<TileWorld>,
    mut pathfinder: ResMut<Pathfinder>,
    paths: Query<(Entity, &TilePosition, &MovePath)>,
) {
    for (entity, position, path) in paths.iter() {
        if path.is_still_valid(&world) || path.awaiting_rebuild(&world) {
            continue;
        }
        match pathfinder.find_route(&world, position.0, path.target) {
            Ok(new_path) => {
                debug!("[PATHFINDING] Re-planned stale route for {:?}", entity);
                commands.entity(entity).insert(new_path);
            }
            Err(e) => {
                log_failure(position.0, path.target, e);
                commands.entity(entity).remove::<MovePath>();
            }
        }
    }
}

fn log_failure(start: IVec2, goal: IVec2, error: PathError) {
    match error {
        PathError::SearchExhausted { .. } | PathError::RegionSearchExhausted { .. } => {
            warn!("[PATHFINDING] {} -> {}: {}", start, goal, error);
        }
        _ => debug!("[PATHFINDING] {} -> {}: {}", start, goal, error),
    }
}
