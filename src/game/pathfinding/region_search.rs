//! Region-level A*.
//!
//! # Graph
//!
//! A search node is a region together with the side the route entered it by. The
//! start region is entered by no side: its outgoing costs are real tile searches from
//! the start tile to each side point, bounded to the region. Every other region uses
//! its cached direction costs. Leaving a region through side `s` costs the cached (or
//! start) path to `s` plus the single crossing step; the neighbour must have the
//! matching side point directly across.
//!
//! Entering the end region also offers a goal candidate whose cost adds the bounded
//! tile path from the entry point to the target. Start and target sharing a region
//! offer the direct in-region path as a candidate up front. The first candidate popped
//! wins.
//!
//! # Output
//!
//! The macro route is rebuilt goal-to-start, then turned into a [`MovePath`]: the
//! start segment and end segment come from the tile searches done during setup, the
//! intermediate regions contribute their cached paths without any new search.

use bevy::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::game::collections::{NodeArena, NodeHandle, OpenHeap, OpenKey};
use crate::game::config::WorldConfig;
use crate::game::math::octile_distance;
use crate::game::world::TileWorld;

use super::astar::TilePathfinder;
use super::region::Region;
use super::types::{MovePath, PathError, RegionDirection, RegionHop, RouteStep, Side, TilePath};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum RegionKey {
    At { region: IVec2, entry: Option<Side> },
    Goal,
}

#[derive(Clone, Copy, Debug)]
struct RegionNode {
    key: RegionKey,
    parent: Option<NodeHandle>,
}

/// Bounded tile paths computed once per query, in walking order.
#[derive(Default)]
struct Endpoints {
    /// Start tile to each side point of the start region.
    start_links: [Option<(Vec<IVec2>, u32)>; 4],
    /// Each side point of the end region to the target.
    end_links: [Option<(Vec<IVec2>, u32)>; 4],
    /// Start to target inside their shared region.
    direct: Option<(Vec<IVec2>, u32)>,
}

fn forward(path: TilePath) -> (Vec<IVec2>, u32) {
    let cost = path.cost;
    (path.into_forward(), cost)
}

/// Region-level A* with long-lived scratch, cleared per query.
pub struct RegionPathfinder {
    open: OpenHeap<NodeHandle>,
    open_costs: FxHashMap<RegionKey, u32>,
    closed: FxHashSet<RegionKey>,
    arena: NodeArena<RegionNode>,
    max_region_search: usize,
}

impl RegionPathfinder {
    pub fn new(max_region_search: usize) -> Self {
        Self {
            open: OpenHeap::with_capacity(max_region_search),
            open_costs: FxHashMap::with_capacity_and_hasher(max_region_search, Default::default()),
            closed: FxHashSet::with_capacity_and_hasher(max_region_search, Default::default()),
            arena: NodeArena::with_capacity(max_region_search),
            max_region_search,
        }
    }

    pub fn max_region_search(&self) -> usize {
        self.max_region_search
    }

    fn clear(&mut self) {
        self.open.clear();
        self.open_costs.clear();
        self.closed.clear();
        self.arena.reset();
    }

    fn endpoints(
        world: &TileWorld,
        tiles: &mut TilePathfinder,
        start: IVec2,
        end: IVec2,
        start_region: &Region,
        end_region: &Region,
    ) -> Endpoints {
        let mut endpoints = Endpoints::default();
        for side in Side::ALL {
            if let Some(point) = start_region.side_point(side) {
                endpoints.start_links[side.index()] = tiles
                    .find_path_within(world, start, point, start_region.bounds)
                    .ok()
                    .map(forward);
            }
            if let Some(point) = end_region.side_point(side) {
                endpoints.end_links[side.index()] = tiles
                    .find_path_within(world, point, end, end_region.bounds)
                    .ok()
                    .map(forward);
            }
        }
        if start_region.coord == end_region.coord {
            endpoints.direct = tiles
                .find_path_within(world, start, end, start_region.bounds)
                .ok()
                .map(forward);
        }
        endpoints
    }

    /// Queue `key` reached at `g_cost`, unless it is closed or already queued cheaper.
    fn discover(
        &mut self,
        key: RegionKey,
        parent: Option<NodeHandle>,
        g_cost: u32,
        h_cost: u32,
    ) -> Result<Option<NodeHandle>, PathError> {
        if self.closed.contains(&key) {
            return Ok(None);
        }
        match self.open_costs.get(&key) {
            Some(&known) if known <= g_cost => return Ok(None),
            Some(_) => {}
            None if self.open_costs.len() >= self.max_region_search => {
                return Err(PathError::RegionSearchExhausted {
                    budget: self.max_region_search,
                });
            }
            None => {}
        }
        self.open_costs.insert(key, g_cost);
        let handle = self.arena.alloc(RegionNode { key, parent });
        self.open.push(OpenKey::new(g_cost, h_cost), handle);
        Ok(Some(handle))
    }

    /// Long-distance route from `start` to `end`.
    pub fn find_path(
        &mut self,
        world: &TileWorld,
        tiles: &mut TilePathfinder,
        start: IVec2,
        end: IVec2,
    ) -> Result<MovePath, PathError> {
        self.clear();
        let layout = *world.layout();

        for (tile, blocked) in [(start, PathError::StartBlocked(start)), (end, PathError::GoalBlocked(end))] {
            match world.tile(tile) {
                None => return Err(PathError::NotResident(tile)),
                Some(t) if t.is_collision() => return Err(blocked),
                Some(_) => {}
            }
        }

        let start_coord = layout.tile_to_region(start);
        let end_coord = layout.tile_to_region(end);
        let start_region = world
            .fresh_region(start_coord)
            .ok_or(PathError::NoRegion(start_coord))?;
        let end_region = world.fresh_region(end_coord).ok_or(PathError::NoRegion(end_coord))?;

        let endpoints = Self::endpoints(world, tiles, start, end, start_region, end_region);

        let root_key = RegionKey::At {
            region: start_coord,
            entry: None,
        };
        let root = self.discover(root_key, None, 0, octile_distance(start, end))?;
        if let Some((_, cost)) = &endpoints.direct {
            self.discover(RegionKey::Goal, root, *cost, 0)?;
        }

        while let Some((key, handle)) = self.open.pop() {
            let Some(&node) = self.arena.get(handle) else {
                continue;
            };
            if !self.closed.insert(node.key) {
                continue;
            }
            let g_cost = key.f_cost - key.h_cost;

            let RegionKey::At { region, entry } = node.key else {
                let move_path = self.build_move_path(world, handle, start, end, &endpoints, g_cost)?;
                debug!(
                    "[PATHFINDING] Route {} -> {}: {} regions, cost {}",
                    start,
                    end,
                    move_path.route.len(),
                    g_cost
                );
                return Ok(move_path);
            };
            let Some(current) = world.fresh_region(region) else {
                continue;
            };

            for exit in Side::ALL {
                if Some(exit) == entry {
                    continue;
                }
                let (Some(exit_point), Some(crossing)) = (current.side_point(exit), current.crossing_cost(exit)) else {
                    continue;
                };
                let inner = match entry {
                    None => endpoints.start_links[exit.index()].as_ref().map(|(_, cost)| *cost),
                    Some(entry) => RegionDirection::new(entry, exit).and_then(|dir| current.direction_cost(dir)),
                };
                let Some(inner) = inner else {
                    continue;
                };

                let next_coord = region + exit.offset();
                let entry_side = exit.opposite();
                let entry_point = exit_point + exit.offset();
                let Some(next) = world.fresh_region(next_coord) else {
                    continue;
                };
                if next.side_point(entry_side) != Some(entry_point) {
                    continue;
                }

                let next_g = g_cost + inner + crossing;
                let next_key = RegionKey::At {
                    region: next_coord,
                    entry: Some(entry_side),
                };
                let child = self.discover(next_key, Some(handle), next_g, octile_distance(entry_point, end))?;

                if next_coord == end_coord {
                    if let (Some(child), Some((_, finish))) = (child, &endpoints.end_links[entry_side.index()]) {
                        self.discover(RegionKey::Goal, Some(child), next_g + finish, 0)?;
                    }
                }
            }
        }

        Err(PathError::Unreachable)
    }

    /// Region-node chain from the goal back to the root, goal first.
    fn chain(&self, goal: NodeHandle) -> Vec<(IVec2, Option<Side>)> {
        let mut steps = Vec::new();
        let mut current = self.arena.get(goal).and_then(|node| node.parent);
        while let Some(handle) = current {
            let Some(node) = self.arena.get(handle) else {
                break;
            };
            if let RegionKey::At { region, entry } = node.key {
                steps.push((region, entry));
            }
            current = node.parent;
        }
        steps
    }

    fn build_move_path(
        &self,
        world: &TileWorld,
        goal: NodeHandle,
        start: IVec2,
        end: IVec2,
        endpoints: &Endpoints,
        cost: u32,
    ) -> Result<MovePath, PathError> {
        let chain = self.chain(goal);

        // Goal-to-start route; each step exits toward the step before it in the list.
        let route = chain
            .iter()
            .enumerate()
            .map(|(i, &(region, entry))| {
                let exit = i
                    .checked_sub(1)
                    .and_then(|prev| Side::from_offset(chain[prev].0 - region));
                let generation = world.regions().generation(region).ok_or(PathError::NoRegion(region))?;
                Ok(RouteStep {
                    region,
                    entry,
                    exit,
                    generation,
                })
            })
            .collect::<Result<Vec<RouteStep>, PathError>>()?;

        if route.len() <= 1 {
            let start_path = endpoints
                .direct
                .as_ref()
                .map(|(tiles, _)| tiles.clone())
                .unwrap_or_else(|| vec![start]);
            return Ok(MovePath {
                target: end,
                start_path,
                hops: Vec::new(),
                end_path: vec![end],
                route,
                cost,
            });
        }

        let first = route[route.len() - 1];
        let last = route[0];
        let start_path = first
            .exit
            .and_then(|exit| endpoints.start_links[exit.index()].as_ref())
            .map(|(tiles, _)| tiles.clone())
            .unwrap_or_else(|| vec![start]);
        let end_path = last
            .entry
            .and_then(|entry| endpoints.end_links[entry.index()].as_ref())
            .map(|(tiles, _)| tiles.clone())
            .unwrap_or_else(|| vec![end]);

        let hops = collect_hops(world, &route[1..route.len() - 1])?;

        Ok(MovePath {
            target: end,
            start_path,
            hops,
            end_path,
            route,
            cost,
        })
    }
}

/// Cached crossings for the intermediate steps of a goal-to-start route, in walking
/// order. Every step must have a fresh region with a cached path for its direction.
pub(super) fn collect_hops(world: &TileWorld, steps: &[RouteStep]) -> Result<Vec<RegionHop>, PathError> {
    steps
        .iter()
        .rev()
        .map(|step| {
            let missing = PathError::NoRegion(step.region);
            let direction = step.direction().ok_or(missing)?;
            let path = world
                .fresh_region(step.region)
                .and_then(|region| region.path(direction))
                .ok_or(missing)?;
            Ok(RegionHop {
                region: step.region,
                direction,
                path: path.clone(),
            })
        })
        .collect()
}

/// Both pathfinders, sized from the world config. One per world, used from the main
/// thread only.
#[derive(Resource)]
pub struct Pathfinder {
    pub tiles: TilePathfinder,
    pub regions: RegionPathfinder,
}

impl Pathfinder {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            tiles: TilePathfinder::new(config.max_search_tiles),
            regions: RegionPathfinder::new(config.max_region_search),
        }
    }

    /// Three-segment route across any number of resident regions.
    pub fn find_route(&mut self, world: &TileWorld, start: IVec2, end: IVec2) -> Result<MovePath, PathError> {
        self.regions.find_path(world, &mut self.tiles, start, end)
    }

    /// Tile path from `start` to `end` that only enters tiles of `allowed` regions.
    pub fn find_local_path(
        &mut self,
        world: &TileWorld,
        start: IVec2,
        end: IVec2,
        allowed: &FxHashSet<IVec2>,
    ) -> Result<TilePath, PathError> {
        let layout = *world.layout();
        self.tiles
            .find_path_filtered(world, start, end, |tile| allowed.contains(&layout.tile_to_region(tile)))
    }
}
