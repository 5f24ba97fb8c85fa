use bevy::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::game::collections::{NodeArena, NodeHandle, OpenHeap, OpenKey};
use crate::game::math::{octile_distance, DIAGONAL_STEP_COST, STRAIGHT_STEP_COST};
use crate::game::world::TileWorld;

use super::types::{PathError, TilePath};

/// 8-connected neighbourhood, cardinals first.
const NEIGHBOR_OFFSETS: [IVec2; 8] = [
    IVec2::new(0, 1),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, -1),
    IVec2::new(-1, 1),
];

#[derive(Clone, Copy, Debug)]
struct TileNode {
    position: IVec2,
    parent: Option<NodeHandle>,
    g_cost: u32,
}

/// Tile-level A* with long-lived scratch.
///
/// The open heap, open-cost map, closed set and node arena are cleared at the start of
/// every search and never reallocated, so one pathfinder serves every query on the
/// main thread. A search that would discover more than `max_search_tiles` tiles gives
/// up with [`PathError::SearchExhausted`]; long routes belong to the region search.
pub struct TilePathfinder {
    open: OpenHeap<NodeHandle>,
    open_costs: FxHashMap<IVec2, u32>,
    closed: FxHashSet<IVec2>,
    arena: NodeArena<TileNode>,
    max_search_tiles: usize,
}

impl TilePathfinder {
    pub fn new(max_search_tiles: usize) -> Self {
        Self {
            open: OpenHeap::with_capacity(max_search_tiles),
            open_costs: FxHashMap::with_capacity_and_hasher(max_search_tiles, Default::default()),
            closed: FxHashSet::with_capacity_and_hasher(max_search_tiles, Default::default()),
            arena: NodeArena::with_capacity(max_search_tiles),
            max_search_tiles,
        }
    }

    pub fn max_search_tiles(&self) -> usize {
        self.max_search_tiles
    }

    /// Tiles discovered by the last search.
    pub fn last_search_size(&self) -> usize {
        self.open_costs.len()
    }

    pub fn find_path(&mut self, world: &TileWorld, start: IVec2, goal: IVec2) -> Result<TilePath, PathError> {
        self.search(world, start, goal, |_| true)
    }

    /// Search that never leaves the inclusive rectangle `bounds`.
    pub fn find_path_within(
        &mut self,
        world: &TileWorld,
        start: IVec2,
        goal: IVec2,
        bounds: IRect,
    ) -> Result<TilePath, PathError> {
        self.search(world, start, goal, |tile| bounds.contains(tile))
    }

    /// Search that only enters tiles accepted by `allowed`.
    pub fn find_path_filtered(
        &mut self,
        world: &TileWorld,
        start: IVec2,
        goal: IVec2,
        allowed: impl Fn(IVec2) -> bool,
    ) -> Result<TilePath, PathError> {
        self.search(world, start, goal, allowed)
    }

    fn clear(&mut self) {
        self.open.clear();
        self.open_costs.clear();
        self.closed.clear();
        self.arena.reset();
    }

    fn search(
        &mut self,
        world: &TileWorld,
        start: IVec2,
        goal: IVec2,
        allowed: impl Fn(IVec2) -> bool,
    ) -> Result<TilePath, PathError> {
        self.clear();
        let mut cursor = world.cursor();

        match cursor.tile(start) {
            None => return Err(PathError::NotResident(start)),
            Some(tile) if tile.is_collision() => return Err(PathError::StartBlocked(start)),
            Some(_) => {}
        }
        match cursor.tile(goal) {
            None => return Err(PathError::NotResident(goal)),
            Some(tile) if tile.is_collision() => return Err(PathError::GoalBlocked(goal)),
            Some(_) => {}
        }
        if !allowed(goal) {
            return Err(PathError::Unreachable);
        }
        if start == goal {
            return Ok(TilePath {
                tiles: vec![start],
                cost: 0,
            });
        }

        let root = self.arena.alloc(TileNode {
            position: start,
            parent: None,
            g_cost: 0,
        });
        self.open.push(OpenKey::new(0, octile_distance(start, goal)), root);
        self.open_costs.insert(start, 0);

        while let Some((_, handle)) = self.open.pop() {
            let Some(&node) = self.arena.get(handle) else {
                continue;
            };
            // Superseded entry for a tile already expanded at a lower cost.
            if !self.closed.insert(node.position) {
                continue;
            }
            if node.position == goal {
                return Ok(self.reconstruct(handle));
            }

            for offset in NEIGHBOR_OFFSETS {
                let next = node.position + offset;
                if self.closed.contains(&next) || !allowed(next) {
                    continue;
                }
                let Some(tile_cost) = cursor.movement_cost(next) else {
                    continue;
                };
                let diagonal = offset.x != 0 && offset.y != 0;
                let step = if diagonal { DIAGONAL_STEP_COST } else { STRAIGHT_STEP_COST };
                let g_cost = node.g_cost + step * tile_cost;
                match self.open_costs.get(&next) {
                    Some(&known) if known <= g_cost => continue,
                    Some(_) => {}
                    None if self.open_costs.len() >= self.max_search_tiles => {
                        debug!(
                            "[PATHFINDING] Tile search {} -> {} exhausted its budget of {}",
                            start, goal, self.max_search_tiles
                        );
                        return Err(PathError::SearchExhausted {
                            budget: self.max_search_tiles,
                        });
                    }
                    None => {}
                }
                self.open_costs.insert(next, g_cost);

                let child = self.arena.alloc(TileNode {
                    position: next,
                    parent: Some(handle),
                    g_cost,
                });
                self.open.push(OpenKey::new(g_cost, octile_distance(next, goal)), child);
            }
        }

        Err(PathError::Unreachable)
    }

    /// Walk parent links from the goal node; the result is goal-to-start.
    fn reconstruct(&self, goal: NodeHandle) -> TilePath {
        let mut tiles = Vec::new();
        let mut cost = 0;
        let mut current = Some(goal);
        while let Some(handle) = current {
            let Some(node) = self.arena.get(handle) else {
                break;
            };
            if tiles.is_empty() {
                cost = node.g_cost;
            }
            tiles.push(node.position);
            current = node.parent;
        }
        TilePath { tiles, cost }
    }
}
