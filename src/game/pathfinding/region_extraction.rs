use bevy::prelude::*;

use crate::game::math::STRAIGHT_STEP_COST;
use crate::game::world::{TileCursor, TileWorld};

use super::astar::TilePathfinder;
use super::region::Region;
use super::types::{RegionDirection, RegionPath, Side};

/// Offsets along a region side in the order they are probed: centre first, then
/// alternating outwards. On an even side the lower of the two centre tiles goes first.
///
/// `side_probe_order(8) == [3, 4, 2, 5, 1, 6, 0, 7]`.
pub fn side_probe_order(len: i32) -> Vec<i32> {
    let mut order: Vec<i32> = (0..len).collect();
    order.sort_by_key(|&i| ((2 * i - (len - 1)).abs(), i));
    order
}

/// Tile on `side` of `bounds` at `offset` along the side. Offsets run along +x for
/// north/south and along +y for east/west, so both regions sharing a boundary walk it
/// identically.
fn side_tile(bounds: IRect, side: Side, offset: i32) -> IVec2 {
    match side {
        Side::North => IVec2::new(bounds.min.x + offset, bounds.max.y),
        Side::South => IVec2::new(bounds.min.x + offset, bounds.min.y),
        Side::East => IVec2::new(bounds.max.x, bounds.min.y + offset),
        Side::West => IVec2::new(bounds.min.x, bounds.min.y + offset),
    }
}

/// First probed tile on `side` that is walkable and whose neighbour across the
/// boundary is walkable too.
fn find_side_point(cursor: &mut TileCursor, bounds: IRect, side: Side, probe_order: &[i32]) -> Option<IVec2> {
    probe_order
        .iter()
        .map(|&offset| side_tile(bounds, side, offset))
        .find(|&tile| cursor.is_walkable(tile) && cursor.is_walkable(tile + side.offset()))
}

/// Build the regions of one chunk from its current tiles.
///
/// Neighbouring chunks are read for the cross-boundary check; tiles in chunks that
/// are not resident count as blocked. Output is in row-major region order.
pub fn extract_chunk_regions(world: &TileWorld, chunk: IVec2, pathfinder: &mut TilePathfinder) -> Vec<Region> {
    let layout = *world.layout();
    let probe_order = side_probe_order(layout.region_size());
    let mut cursor = world.cursor();

    layout
        .chunk_regions(chunk)
        .map(|coord| {
            let bounds = layout.region_bounds(coord);
            let mut sides = [None; 4];
            let mut crossing_costs = [None; 4];
            for side in Side::ALL {
                let Some(tile) = find_side_point(&mut cursor, bounds, side, &probe_order) else {
                    continue;
                };
                sides[side.index()] = Some(tile);
                crossing_costs[side.index()] = cursor
                    .movement_cost(tile + side.offset())
                    .map(|cost| STRAIGHT_STEP_COST * cost);
            }

            let mut paths: [Option<RegionPath>; RegionDirection::COUNT] = Default::default();
            for direction in RegionDirection::all() {
                let (Some(from), Some(to)) = (sides[direction.from().index()], sides[direction.to().index()]) else {
                    continue;
                };
                match pathfinder.find_path_within(world, from, to, bounds) {
                    Ok(path) => paths[direction.index()] = Some(RegionPath::from(path)),
                    Err(e) => trace!("[REGIONS] {} {:?}: {}", coord, direction, e),
                }
            }

            Region {
                coord,
                bounds,
                sides,
                crossing_costs,
                paths,
            }
        })
        .collect()
}
