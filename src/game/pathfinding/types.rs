use bevy::prelude::*;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::game::world::TileWorld;

/// Cardinal side of a region. North is +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Step that crosses this side into the neighbouring region.
    #[inline]
    pub fn offset(self) -> IVec2 {
        match self {
            Side::North => IVec2::Y,
            Side::East => IVec2::X,
            Side::South => IVec2::NEG_Y,
            Side::West => IVec2::NEG_X,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Side shared with the region at `delta`, if `delta` is a unit cardinal step.
    pub fn from_offset(delta: IVec2) -> Option<Side> {
        Side::ALL.into_iter().find(|side| side.offset() == delta)
    }
}

/// Ordered pair of distinct sides: which side a path enters a region by and which it
/// leaves by. There are 12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionDirection {
    from: Side,
    to: Side,
}

impl RegionDirection {
    pub const COUNT: usize = 12;

    pub fn new(from: Side, to: Side) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }

    pub fn from(self) -> Side {
        self.from
    }

    pub fn to(self) -> Side {
        self.to
    }

    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Dense index in `0..12`, grouped by `from` side.
    #[inline]
    pub fn index(self) -> usize {
        let to = self.to.index();
        let slot = if to > self.from.index() { to - 1 } else { to };
        self.from.index() * 3 + slot
    }

    /// All 12 directions in index order.
    pub fn all() -> impl Iterator<Item = RegionDirection> {
        Side::ALL
            .into_iter()
            .flat_map(|from| Side::ALL.into_iter().filter_map(move |to| RegionDirection::new(from, to)))
    }
}

/// Tile path produced by the tile pathfinder, stored goal-to-start. Both endpoints
/// are included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilePath {
    pub tiles: Vec<IVec2>,
    pub cost: u32,
}

impl TilePath {
    pub fn start(&self) -> Option<IVec2> {
        self.tiles.last().copied()
    }

    pub fn goal(&self) -> Option<IVec2> {
        self.tiles.first().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in walking order, start first.
    pub fn into_forward(mut self) -> Vec<IVec2> {
        self.tiles.reverse();
        self.tiles
    }
}

/// Cached path between two side points of one region, in walking order.
///
/// Inline storage covers the common case; longer paths (winding interiors of large
/// regions) spill to the heap rather than being cut short.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionPath {
    pub tiles: SmallVec<[IVec2; 32]>,
    pub cost: u32,
}

impl From<TilePath> for RegionPath {
    fn from(path: TilePath) -> Self {
        Self {
            tiles: path.tiles.into_iter().rev().collect(),
            cost: path.cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("start tile {0} is blocked")]
    StartBlocked(IVec2),
    #[error("goal tile {0} is blocked")]
    GoalBlocked(IVec2),
    #[error("tile {0} is not in a resident chunk")]
    NotResident(IVec2),
    #[error("tile search exceeded its budget of {budget} tiles")]
    SearchExhausted { budget: usize },
    #[error("region search exceeded its budget of {budget} nodes")]
    RegionSearchExhausted { budget: usize },
    #[error("no path exists")]
    Unreachable,
    #[error("region {0} has no up-to-date region data")]
    NoRegion(IVec2),
}

/// One region of a macro route.
///
/// `entry` is `None` for the region the route starts in; `exit` is `None` for the
/// region it ends in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteStep {
    pub region: IVec2,
    pub entry: Option<Side>,
    pub exit: Option<Side>,
    /// [`RegionMap::generation`](super::RegionMap::generation) when the route was planned.
    pub generation: u64,
}

impl RouteStep {
    /// Cached direction used to cross this region, for intermediate steps.
    pub fn direction(&self) -> Option<RegionDirection> {
        RegionDirection::new(self.entry?, self.exit?)
    }
}

/// An intermediate region crossed by following its cached direction path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionHop {
    pub region: IVec2,
    pub direction: RegionDirection,
    pub path: RegionPath,
}

/// Three-segment movement path handed to the movement consumer.
///
/// `start_path` runs from the start tile to the first region's exit point, `hops` are
/// the cached crossings of intermediate regions, and `end_path` runs from the last
/// region's entry point to the target. When start and target share a region,
/// `start_path` covers the whole distance and `end_path` is the target alone.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct MovePath {
    pub target: IVec2,
    pub start_path: Vec<IVec2>,
    pub hops: Vec<RegionHop>,
    pub end_path: Vec<IVec2>,
    /// Macro route, goal-to-start.
    pub route: Vec<RouteStep>,
    pub cost: u32,
}

impl MovePath {
    /// Every tile to walk through, start first, without consecutive duplicates.
    pub fn waypoints(&self) -> Vec<IVec2> {
        let mut points: Vec<IVec2> = Vec::with_capacity(
            self.start_path.len()
                + self.hops.iter().map(|hop| hop.path.tiles.len()).sum::<usize>()
                + self.end_path.len(),
        );
        let segments = std::iter::once(self.start_path.as_slice())
            .chain(self.hops.iter().map(|hop| hop.path.tiles.as_slice()))
            .chain(std::iter::once(self.end_path.as_slice()));
        for segment in segments {
            for &tile in segment {
                if points.last() != Some(&tile) {
                    points.push(tile);
                }
            }
        }
        points
    }

    /// Regions the route passes through.
    pub fn regions(&self) -> FxHashSet<IVec2> {
        self.route.iter().map(|step| step.region).collect()
    }

    /// False once any region on the route has been unloaded, is awaiting a rebuild, or
    /// was rebuilt after the route was planned.
    pub fn is_still_valid(&self, world: &TileWorld) -> bool {
        self.route.iter().all(|step| {
            world.fresh_region(step.region).is_some()
                && world.regions().generation(step.region) == Some(step.generation)
        })
    }

    /// True while a resident region of the route is queued for a rebuild. Re-planning
    /// before it settles would search over half-updated regions.
    pub fn awaiting_rebuild(&self, world: &TileWorld) -> bool {
        self.route.iter().any(|step| world.region_pending(step.region))
    }
}
