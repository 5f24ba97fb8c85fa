//! Tests for tile A*, region extraction and the region route search

use super::region_search::collect_hops;
use super::*;
use crate::game::config::WorldConfig;
use crate::game::math::{DIAGONAL_STEP_COST, STRAIGHT_STEP_COST};
use crate::game::tiles::{tile_ids, Tile, TileGrid, TileRegistry};
use crate::game::world::{BakeQueue, TileWorld};
use bevy::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

// ============================================================================
// Helpers
// ============================================================================

fn config(chunk_size: i32, divisions: i32) -> WorldConfig {
    WorldConfig {
        chunk_size,
        divisions,
        view_distance_chunks: 1,
        max_search_tiles: 4096,
        max_region_search: 2048,
        ..default()
    }
}

fn grass() -> Tile {
    Tile::new(tile_ids::GRASS, tile_ids::AIR, &TileRegistry::default())
}

fn sand() -> Tile {
    Tile::new(tile_ids::SAND, tile_ids::AIR, &TileRegistry::default())
}

fn wall() -> Tile {
    Tile::new(tile_ids::DIRT, tile_ids::STONE, &TileRegistry::default())
}

fn open_grid(size: i32) -> TileGrid {
    TileGrid::filled(size, grass())
}

/// World with the given chunks resident and all regions extracted.
fn build_world(config: WorldConfig, chunks: Vec<(IVec2, TileGrid)>) -> (TileWorld, Pathfinder) {
    let mut world = TileWorld::new(config.clone(), TileRegistry::default());
    let mut pathfinder = Pathfinder::new(&config);
    for (coord, mut grid) in chunks {
        assert!(world.load_chunk(coord, &mut grid));
    }
    settle(&mut world, &mut pathfinder);
    (world, pathfinder)
}

/// Run dirty walks until nothing is left to rebuild.
fn settle(world: &mut TileWorld, pathfinder: &mut Pathfinder) {
    for _ in 0..8 {
        let walk = world.process_dirty_chunks(&mut pathfinder.tiles, &mut BakeQueue::default());
        if walk.rebuilt.is_empty() {
            return;
        }
    }
    panic!("dirty walk did not settle");
}

fn random_grid(rng: &mut fastrand::Rng, size: i32, wall_percent: u32, with_sand: bool) -> TileGrid {
    let mut grid = open_grid(size);
    for y in 0..size {
        for x in 0..size {
            let roll = rng.u32(0..100);
            let tile = if roll < wall_percent {
                wall()
            } else if with_sand && roll < wall_percent + 20 {
                sand()
            } else {
                grass()
            };
            grid.set(IVec2::new(x, y), tile);
        }
    }
    grid
}

/// Reference shortest-path costs from `start` over a single chunk at the origin, using
/// the same movement rules as the tile pathfinder.
fn dijkstra(world: &TileWorld, size: i32, start: IVec2) -> Vec<Option<u32>> {
    let index = |p: IVec2| (p.y * size + p.x) as usize;
    let in_chunk = |p: IVec2| p.x >= 0 && p.y >= 0 && p.x < size && p.y < size;
    let walkable = |p: IVec2| in_chunk(p) && world.tile(p).is_some_and(|t| !t.is_collision());

    let mut dist = vec![None; (size * size) as usize];
    let mut heap = BinaryHeap::new();
    dist[index(start)] = Some(0);
    heap.push(Reverse((0u32, start.x, start.y)));

    while let Some(Reverse((cost, x, y))) = heap.pop() {
        let pos = IVec2::new(x, y);
        if dist[index(pos)] != Some(cost) {
            continue;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let next = pos + IVec2::new(dx, dy);
                if !walkable(next) {
                    continue;
                }
                let diagonal = dx != 0 && dy != 0;
                let tile = world.tile(next).unwrap();
                let base = if diagonal { DIAGONAL_STEP_COST } else { STRAIGHT_STEP_COST };
                let next_cost = cost + base * world.registry().movement_cost(tile);
                if dist[index(next)].is_none_or(|known| next_cost < known) {
                    dist[index(next)] = Some(next_cost);
                    heap.push(Reverse((next_cost, next.x, next.y)));
                }
            }
        }
    }
    dist
}

/// Steps are 8-adjacent, walkable, and sum to the reported cost.
fn assert_valid_path(world: &TileWorld, forward: &[IVec2], cost: u32) {
    let mut total = 0;
    for pair in forward.windows(2) {
        let delta = (pair[1] - pair[0]).abs();
        assert!(delta.max_element() == 1, "{} -> {} is not a single step", pair[0], pair[1]);
        let tile = world.tile(pair[1]).expect("path tile must be resident");
        assert!(!tile.is_collision(), "path enters wall at {}", pair[1]);
        let base = if delta.x == 1 && delta.y == 1 { DIAGONAL_STEP_COST } else { STRAIGHT_STEP_COST };
        total += base * world.registry().movement_cost(tile);
    }
    assert_eq!(total, cost, "path cost does not match its steps");
}

// ============================================================================
// Direction bookkeeping
// ============================================================================

#[test]
fn test_region_direction_indices_are_dense() {
    let indices: Vec<usize> = RegionDirection::all().map(|d| d.index()).collect();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert!(RegionDirection::new(Side::North, Side::North).is_none());

    let north_east = RegionDirection::new(Side::North, Side::East).unwrap();
    assert_eq!(north_east.reversed(), RegionDirection::new(Side::East, Side::North).unwrap());
    assert_eq!(Side::from_offset(IVec2::NEG_X), Some(Side::West));
    assert_eq!(Side::North.opposite(), Side::South);
}

#[test]
fn test_side_probe_order_is_centre_first() {
    assert_eq!(side_probe_order(8), vec![3, 4, 2, 5, 1, 6, 0, 7]);
    assert_eq!(side_probe_order(5), vec![2, 1, 3, 0, 4]);
    assert_eq!(side_probe_order(1), vec![0]);
}

// ============================================================================
// Tile A*
// ============================================================================

#[test]
fn test_tile_astar_matches_dijkstra_on_random_grids() {
    let size = 16;
    for seed in 0..12u64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let grid = random_grid(&mut rng, size, 25, seed % 2 == 1);
        let (world, mut pathfinder) = build_world(config(size, 2), vec![(IVec2::ZERO, grid)]);

        let walkable: Vec<IVec2> = (0..size)
            .flat_map(|y| (0..size).map(move |x| IVec2::new(x, y)))
            .filter(|&p| !world.tile(p).unwrap().is_collision())
            .collect();

        for _ in 0..15 {
            let start = walkable[rng.usize(0..walkable.len())];
            let goal = walkable[rng.usize(0..walkable.len())];
            let expected = dijkstra(&world, size, start)[(goal.y * size + goal.x) as usize];

            match (pathfinder.tiles.find_path(&world, start, goal), expected) {
                (Ok(path), Some(cost)) => {
                    assert_eq!(path.cost, cost, "seed {} {} -> {}", seed, start, goal);
                    assert_eq!(path.goal(), Some(goal));
                    assert_eq!(path.start(), Some(start));
                    assert_valid_path(&world, &path.clone().into_forward(), path.cost);
                }
                (Err(PathError::Unreachable), None) => {}
                (result, expected) => {
                    panic!("seed {} {} -> {}: got {:?}, expected {:?}", seed, start, goal, result, expected)
                }
            }
        }
    }
}

#[test]
fn test_tile_astar_endpoints() {
    let mut grid = open_grid(16);
    grid.set(IVec2::new(8, 8), wall());
    let (world, mut pathfinder) = build_world(config(16, 2), vec![(IVec2::ZERO, grid)]);

    let same = pathfinder.tiles.find_path(&world, IVec2::new(3, 3), IVec2::new(3, 3)).unwrap();
    assert_eq!(same.tiles, vec![IVec2::new(3, 3)]);
    assert_eq!(same.cost, 0);

    assert_eq!(
        pathfinder.tiles.find_path(&world, IVec2::new(8, 8), IVec2::new(1, 1)),
        Err(PathError::StartBlocked(IVec2::new(8, 8)))
    );
    assert_eq!(
        pathfinder.tiles.find_path(&world, IVec2::new(1, 1), IVec2::new(8, 8)),
        Err(PathError::GoalBlocked(IVec2::new(8, 8)))
    );
    assert_eq!(
        pathfinder.tiles.find_path(&world, IVec2::new(1, 1), IVec2::new(40, 1)),
        Err(PathError::NotResident(IVec2::new(40, 1)))
    );

    // Goal-to-start ordering.
    let path = pathfinder.tiles.find_path(&world, IVec2::new(0, 0), IVec2::new(3, 0)).unwrap();
    assert_eq!(path.tiles, vec![IVec2::new(3, 0), IVec2::new(2, 0), IVec2::new(1, 0), IVec2::new(0, 0)]);
    assert_eq!(path.cost, 3 * STRAIGHT_STEP_COST);
}

#[test]
fn test_tile_astar_steps_diagonally_between_walls() {
    let mut grid = open_grid(16);
    grid.set(IVec2::new(6, 5), wall());
    grid.set(IVec2::new(5, 6), wall());
    let (world, mut pathfinder) = build_world(config(16, 2), vec![(IVec2::ZERO, grid)]);

    let path = pathfinder.tiles.find_path(&world, IVec2::new(5, 5), IVec2::new(6, 6)).unwrap();
    assert_eq!(path.tiles, vec![IVec2::new(6, 6), IVec2::new(5, 5)]);
    assert_eq!(path.cost, DIAGONAL_STEP_COST);
}

#[test]
fn test_tile_astar_diagonal_is_the_only_link() {
    // Solid rock except two diagonally touching tiles.
    let mut grid = TileGrid::filled(16, wall());
    grid.set(IVec2::new(5, 5), grass());
    grid.set(IVec2::new(6, 6), grass());
    let mut world = TileWorld::new(config(16, 2), TileRegistry::default());
    let mut tiles = TilePathfinder::new(4096);
    assert!(world.load_chunk(IVec2::ZERO, &mut grid));

    let path = tiles.find_path(&world, IVec2::new(5, 5), IVec2::new(6, 6)).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path.cost, DIAGONAL_STEP_COST);
    assert_valid_path(&world, &path.into_forward(), DIAGONAL_STEP_COST);
}

#[test]
fn test_tile_astar_enclosed_goal_terminates() {
    // A 3x3 chunk block, goal sealed in a ring of walls.
    let size = 32;
    let goal = IVec2::new(48, 48);
    let mut chunks = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            chunks.push((IVec2::new(x, y), open_grid(size)));
        }
    }
    let mut cfg = config(size, 4);
    cfg.max_search_tiles = 20_000;
    let (mut world, mut pathfinder) = build_world(cfg, chunks);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                world.set_tile(goal + IVec2::new(dx, dy), wall());
            }
        }
    }
    settle(&mut world, &mut pathfinder);

    // Large budget: the whole reachable area is explored, then the search gives up.
    assert_eq!(
        pathfinder.tiles.find_path(&world, IVec2::new(2, 2), goal),
        Err(PathError::Unreachable)
    );

    // Small budget: the search stops at the budget instead.
    let mut small = TilePathfinder::new(500);
    assert_eq!(
        small.find_path(&world, IVec2::new(2, 2), goal),
        Err(PathError::SearchExhausted { budget: 500 })
    );
    assert!(small.last_search_size() <= 500);

    // Region search terminates too.
    assert_eq!(
        pathfinder.find_route(&world, IVec2::new(2, 2), goal),
        Err(PathError::Unreachable)
    );
}

// ============================================================================
// Region extraction
// ============================================================================

#[test]
fn test_region_walled_except_north_and_east() {
    // Chunk of 16 split 2x2: region (0,0) spans tiles (0,0)..=(7,7).
    let mut grid = open_grid(16);
    for i in 0..8 {
        grid.set(IVec2::new(0, i), wall());
        grid.set(IVec2::new(i, 0), wall());
    }
    let (world, _) = build_world(config(16, 2), vec![(IVec2::ZERO, grid)]);

    let region = world.fresh_region(IVec2::ZERO).expect("region must be extracted");
    assert_eq!(region.side_count(), 2);
    assert_eq!(region.side_point(Side::North), Some(IVec2::new(3, 7)));
    assert_eq!(region.side_point(Side::East), Some(IVec2::new(7, 3)));
    assert_eq!(region.side_point(Side::South), None);
    assert_eq!(region.side_point(Side::West), None);

    assert_eq!(region.path_count(), 2);
    let north_east = RegionDirection::new(Side::North, Side::East).unwrap();
    let to_east = region.path(north_east).unwrap();
    let to_north = region.path(north_east.reversed()).unwrap();
    assert_eq!(to_east.tiles.first(), Some(&IVec2::new(3, 7)));
    assert_eq!(to_east.tiles.last(), Some(&IVec2::new(7, 3)));
    assert_eq!(to_north.tiles.first(), Some(&IVec2::new(7, 3)));
    assert_eq!(to_east.cost, 4 * DIAGONAL_STEP_COST);
    assert_eq!(to_north.cost, to_east.cost);
    for direction in RegionDirection::all() {
        if direction != north_east && direction != north_east.reversed() {
            assert!(region.path(direction).is_none(), "{:?} should be absent", direction);
        }
    }

    let portals = region.portals();
    assert_eq!(portals.len(), 2);
    assert!(portals[0].links.contains(&PortalLink::Crossing {
        region: IVec2::new(0, 1),
        tile: IVec2::new(3, 8),
        cost: STRAIGHT_STEP_COST,
    }));
}

#[test]
fn test_region_extraction_is_deterministic() {
    let mut rng = fastrand::Rng::with_seed(99);
    let grid = random_grid(&mut rng, 32, 30, true);

    let (world_a, mut pathfinder_a) = build_world(config(32, 4), vec![(IVec2::ZERO, grid.clone())]);
    let (world_b, _) = build_world(config(32, 4), vec![(IVec2::ZERO, grid)]);

    let first = extract_chunk_regions(&world_a, IVec2::ZERO, &mut pathfinder_a.tiles);
    let second = extract_chunk_regions(&world_a, IVec2::ZERO, &mut pathfinder_a.tiles);
    assert_eq!(first.len(), 16);
    assert_eq!(first, second);

    for region in &first {
        assert_eq!(world_b.fresh_region(region.coord), Some(region));
    }
}

#[test]
fn test_adjacent_regions_share_crossing_points() {
    let mut rng = fastrand::Rng::with_seed(7);
    let grid = random_grid(&mut rng, 32, 20, false);
    let (world, _) = build_world(config(32, 4), vec![(IVec2::ZERO, grid)]);

    for y in 0..4 {
        for x in 0..3 {
            let west = world.fresh_region(IVec2::new(x, y)).unwrap();
            let east = world.fresh_region(IVec2::new(x + 1, y)).unwrap();
            assert_eq!(
                west.side_point(Side::East).map(|p| p + IVec2::X),
                east.side_point(Side::West)
            );
        }
    }
}

#[test]
fn test_long_region_paths_are_not_truncated() {
    // Serpentine region interior: the cached path is longer than the inline buffer.
    let size = 32;
    let mut grid = open_grid(size);
    for x in (2..14).step_by(2) {
        let gap_y = if (x / 2) % 2 == 0 { 0 } else { 15 };
        for y in 0..16 {
            if y != gap_y {
                grid.set(IVec2::new(x, y), wall());
            }
        }
    }
    let (world, _) = build_world(config(size, 2), vec![(IVec2::ZERO, grid)]);

    let region = world.fresh_region(IVec2::ZERO).unwrap();
    let north_east = RegionDirection::new(Side::North, Side::East).unwrap();
    let path = region.path(north_east).expect("north to east must connect");
    assert!(path.tiles.len() > 32, "path has only {} tiles", path.tiles.len());
    assert_eq!(path.tiles.first().copied(), region.side_point(Side::North));
    assert_eq!(path.tiles.last().copied(), region.side_point(Side::East));
    assert_valid_path(&world, &path.tiles, path.cost);
}

// ============================================================================
// Region route search
// ============================================================================

#[test]
fn test_route_within_single_region() {
    let (world, mut pathfinder) = build_world(config(16, 2), vec![(IVec2::ZERO, open_grid(16))]);
    let start = IVec2::new(2, 2);
    let end = IVec2::new(5, 5);

    let path = pathfinder.find_route(&world, start, end).unwrap();
    assert_eq!(path.route.len(), 1);
    assert_eq!(path.route[0].region, IVec2::ZERO);
    assert!(path.hops.is_empty());
    assert_eq!(path.start_path.first(), Some(&start));
    assert_eq!(path.start_path.last(), Some(&end));
    assert_eq!(path.end_path, vec![end]);
    assert_eq!(path.cost, 3 * DIAGONAL_STEP_COST);
    assert_eq!(path.waypoints(), path.start_path);
}

#[test]
fn test_route_across_chunks_stitches_segments() {
    let size = 16;
    let mut left = open_grid(size);
    // Wall across the left chunk with a single gap near the top.
    for y in 0..size - 2 {
        left.set(IVec2::new(9, y), wall());
    }
    let (world, mut pathfinder) = build_world(
        config(size, 2),
        vec![(IVec2::ZERO, left), (IVec2::new(1, 0), open_grid(size))],
    );
    let start = IVec2::new(1, 1);
    let end = IVec2::new(30, 2);

    let path = pathfinder.find_route(&world, start, end).unwrap();
    assert_eq!(path.route.first().map(|s| s.region), Some(IVec2::new(3, 0)));
    assert_eq!(path.route.last().map(|s| s.region), Some(IVec2::ZERO));
    assert_eq!(path.route.last().and_then(|s| s.entry), None);
    assert_eq!(path.route.first().and_then(|s| s.exit), None);
    assert!(path.route.len() >= 4);
    assert_eq!(path.hops.len(), path.route.len() - 2);

    let waypoints = path.waypoints();
    assert_eq!(waypoints.first(), Some(&start));
    assert_eq!(waypoints.last(), Some(&end));
    assert_valid_path(&world, &waypoints, path.cost);
    assert!(waypoints.iter().any(|p| p.x == 9), "route must pass the wall through its gap");
    assert!(path.is_still_valid(&world));
}

#[test]
fn test_route_failures() {
    let (world, mut pathfinder) = build_world(config(16, 2), vec![(IVec2::ZERO, open_grid(16))]);
    assert_eq!(
        pathfinder.find_route(&world, IVec2::new(1, 1), IVec2::new(100, 1)),
        Err(PathError::NotResident(IVec2::new(100, 1)))
    );

    let mut tiny = RegionPathfinder::new(1);
    let mut tiles = TilePathfinder::new(4096);
    assert_eq!(
        tiny.find_path(&world, &mut tiles, IVec2::new(1, 1), IVec2::new(14, 14)),
        Err(PathError::RegionSearchExhausted { budget: 1 })
    );
}

#[test]
fn test_route_goes_stale_when_chunk_unloads() {
    let (mut world, mut pathfinder) = build_world(
        config(16, 2),
        vec![(IVec2::ZERO, open_grid(16)), (IVec2::new(1, 0), open_grid(16))],
    );
    let path = pathfinder.find_route(&world, IVec2::new(1, 1), IVec2::new(30, 1)).unwrap();
    assert!(path.is_still_valid(&world));

    assert!(world.unload_chunk(IVec2::new(1, 0)));
    assert!(!path.is_still_valid(&world));
    assert!(matches!(
        pathfinder.find_route(&world, IVec2::new(1, 1), IVec2::new(30, 1)),
        Err(PathError::NotResident(_))
    ));
}

#[test]
fn test_route_goes_stale_when_a_crossed_region_is_rebuilt() {
    let (mut world, mut pathfinder) = build_world(
        config(16, 2),
        vec![(IVec2::ZERO, open_grid(16)), (IVec2::new(1, 0), open_grid(16))],
    );
    let start = IVec2::new(1, 1);
    let end = IVec2::new(30, 1);
    let path = pathfinder.find_route(&world, start, end).unwrap();
    assert_eq!(path.hops.len(), 2);
    let blocked = path.hops[0].path.tiles[1];
    assert_eq!(blocked, IVec2::new(9, 3));

    world.set_tile(blocked, wall());
    assert!(path.awaiting_rebuild(&world));
    assert!(!path.is_still_valid(&world));

    // Rebuilt regions are fresh again, but the cached hop is not the one planned with.
    settle(&mut world, &mut pathfinder);
    assert!(!path.awaiting_rebuild(&world));
    assert!(!path.is_still_valid(&world));

    let replanned = pathfinder.find_route(&world, start, end).unwrap();
    assert!(replanned.is_still_valid(&world));
    let waypoints = replanned.waypoints();
    assert!(!waypoints.contains(&blocked));
    assert_valid_path(&world, &waypoints, replanned.cost);
}

#[test]
fn test_rebuild_only_renews_rebuilt_regions() {
    let (mut world, mut pathfinder) = build_world(
        config(16, 2),
        vec![
            (IVec2::ZERO, open_grid(16)),
            (IVec2::new(1, 0), open_grid(16)),
            (IVec2::new(0, 1), open_grid(16)),
        ],
    );
    let path = pathfinder.find_route(&world, IVec2::new(1, 1), IVec2::new(30, 1)).unwrap();

    // Chunk (0, 1) is a neighbour of the route's first chunk only; editing its far
    // corner rebuilds it and, through propagation, chunk (0, 0).
    world.set_tile(IVec2::new(15, 31), wall());
    settle(&mut world, &mut pathfinder);
    assert!(!path.is_still_valid(&world));

    // Chunk (1, 0) was not rebuilt, so its regions kept their generation.
    let untouched = path.route.iter().find(|step| step.region == IVec2::new(3, 0)).unwrap();
    assert_eq!(world.regions().generation(untouched.region), Some(untouched.generation));
}

#[test]
fn test_hops_require_cached_region_paths() {
    // Region (0, 0) walled on its south and west sides: no west-to-east crossing.
    let mut grid = open_grid(16);
    for i in 0..8 {
        grid.set(IVec2::new(0, i), wall());
        grid.set(IVec2::new(i, 0), wall());
    }
    let (world, _) = build_world(config(16, 2), vec![(IVec2::ZERO, grid)]);
    let step = |region: IVec2, entry: Option<Side>, exit: Option<Side>| RouteStep {
        region,
        entry,
        exit,
        generation: world.regions().generation(region).unwrap_or(0),
    };

    let hops = collect_hops(&world, &[step(IVec2::new(1, 0), Some(Side::West), Some(Side::North))]).unwrap();
    assert_eq!(hops.len(), 1);
    assert_eq!(hops[0].path.tiles.first(), Some(&IVec2::new(8, 3)));
    assert_eq!(hops[0].path.tiles.last(), Some(&IVec2::new(11, 7)));

    assert_eq!(
        collect_hops(&world, &[step(IVec2::ZERO, Some(Side::West), Some(Side::East))]),
        Err(PathError::NoRegion(IVec2::ZERO))
    );
    assert_eq!(
        collect_hops(&world, &[step(IVec2::new(5, 0), Some(Side::West), Some(Side::East))]),
        Err(PathError::NoRegion(IVec2::new(5, 0)))
    );
    assert_eq!(
        collect_hops(&world, &[step(IVec2::new(1, 0), None, Some(Side::East))]),
        Err(PathError::NoRegion(IVec2::new(1, 0)))
    );
}

#[test]
fn test_local_path_stays_in_allowed_regions() {
    let (world, mut pathfinder) = build_world(
        config(16, 2),
        vec![(IVec2::ZERO, open_grid(16)), (IVec2::new(1, 0), open_grid(16))],
    );
    let start = IVec2::new(1, 1);
    let end = IVec2::new(30, 1);

    // Only the bottom row of regions.
    let allowed: FxHashSet<IVec2> = (0..4).map(|x| IVec2::new(x, 0)).collect();
    let path = pathfinder.find_local_path(&world, start, end, &allowed).unwrap();
    let layout = *world.layout();
    assert!(path.tiles.iter().all(|&t| allowed.contains(&layout.tile_to_region(t))));
    assert_eq!(path.cost, 29 * STRAIGHT_STEP_COST);

    let route = pathfinder.find_route(&world, start, end).unwrap();
    let local = pathfinder.find_local_path(&world, start, end, &route.regions()).unwrap();
    assert_eq!(local.goal(), Some(end));

    let without_goal: FxHashSet<IVec2> = (0..3).map(|x| IVec2::new(x, 0)).collect();
    assert_eq!(
        pathfinder.find_local_path(&world, start, end, &without_goal),
        Err(PathError::Unreachable)
    );
}
