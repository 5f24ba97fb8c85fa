use bevy::math::{IRect, IVec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::game::math::GridLayout;
use crate::game::world::TileWorld;

use super::types::{RegionDirection, RegionPath, Side};

/// Navigation data for one `region_size × region_size` block of tiles.
///
/// Always rebuilt whole, together with the rest of its chunk's regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub coord: IVec2,
    /// Inclusive tile bounds.
    pub bounds: IRect,
    /// Crossing tile per side, indexed by [`Side::index`]. `None` means the side is sealed.
    pub sides: [Option<IVec2>; 4],
    /// Cost of the single step from a side's crossing tile into the neighbouring region.
    pub crossing_costs: [Option<u32>; 4],
    /// Cached side-to-side paths, indexed by [`RegionDirection::index`].
    pub paths: [Option<RegionPath>; RegionDirection::COUNT],
}

/// Link from a portal to another point reachable from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalLink {
    /// Another portal of the same region, via the cached direction path.
    Internal { to: Side, direction: RegionDirection, cost: u32 },
    /// The matching tile across the boundary, one step away.
    Crossing { region: IVec2, tile: IVec2, cost: u32 },
}

/// A side crossing point together with where it leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal {
    pub side: Side,
    pub tile: IVec2,
    pub links: SmallVec<[PortalLink; 4]>,
}

impl Region {
    #[inline]
    pub fn side_point(&self, side: Side) -> Option<IVec2> {
        self.sides[side.index()]
    }

    #[inline]
    pub fn crossing_cost(&self, side: Side) -> Option<u32> {
        self.crossing_costs[side.index()]
    }

    #[inline]
    pub fn path(&self, direction: RegionDirection) -> Option<&RegionPath> {
        self.paths[direction.index()].as_ref()
    }

    #[inline]
    pub fn direction_cost(&self, direction: RegionDirection) -> Option<u32> {
        self.path(direction).map(|path| path.cost)
    }

    pub fn side_count(&self) -> usize {
        self.sides.iter().flatten().count()
    }

    pub fn path_count(&self) -> usize {
        self.paths.iter().flatten().count()
    }

    pub fn contains_tile(&self, tile: IVec2) -> bool {
        self.bounds.contains(tile)
    }

    /// Portals of this region, one per open side, in [`Side::ALL`] order.
    pub fn portals(&self) -> Vec<Portal> {
        Side::ALL
            .into_iter()
            .filter_map(|side| {
                let tile = self.side_point(side)?;
                let mut links: SmallVec<[PortalLink; 4]> = RegionDirection::all()
                    .filter(|direction| direction.from() == side)
                    .filter_map(|direction| {
                        let cost = self.direction_cost(direction)?;
                        Some(PortalLink::Internal {
                            to: direction.to(),
                            direction,
                            cost,
                        })
                    })
                    .collect();
                if let Some(cost) = self.crossing_cost(side) {
                    links.push(PortalLink::Crossing {
                        region: self.coord + side.offset(),
                        tile: tile + side.offset(),
                        cost,
                    });
                }
                Some(Portal { side, tile, links })
            })
            .collect()
    }
}

/// All extracted regions, keyed by region coordinate.
///
/// Every stored region carries a generation drawn from a map-wide counter, so a
/// rebuilt or reloaded region never shares a generation with the data it replaced.
#[derive(Debug)]
pub struct RegionMap {
    layout: GridLayout,
    regions: FxHashMap<IVec2, (Region, u64)>,
    next_generation: u64,
}

impl RegionMap {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            regions: FxHashMap::default(),
            next_generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Store freshly extracted regions, unconditionally replacing existing entries.
    pub fn replace(&mut self, regions: impl IntoIterator<Item = Region>) {
        for region in regions {
            self.next_generation += 1;
            self.regions.insert(region.coord, (region, self.next_generation));
        }
    }

    /// Drop every region of `chunk`. Returns how many were present.
    pub fn remove_chunk(&mut self, chunk: IVec2) -> usize {
        self.layout
            .chunk_regions(chunk)
            .filter(|coord| self.regions.remove(coord).is_some())
            .count()
    }

    /// Region data regardless of freshness. Prefer [`RegionMap::get_fresh`].
    pub fn get(&self, region: IVec2) -> Option<&Region> {
        self.regions.get(&region).map(|(region, _)| region)
    }

    /// Generation of the stored data for `region`; changes on every rebuild.
    pub fn generation(&self, region: IVec2) -> Option<u64> {
        self.regions.get(&region).map(|&(_, generation)| generation)
    }

    /// Region data only if its chunk is resident and not awaiting a rebuild.
    pub fn get_fresh(&self, region: IVec2, world: &TileWorld) -> Option<&Region> {
        let chunk = world.chunk(self.layout.region_to_chunk(region))?;
        if !chunk.regions_fresh() {
            return None;
        }
        self.get(region)
    }

    pub fn region_at_tile(&self, tile: IVec2) -> Option<&Region> {
        self.get(self.layout.tile_to_region(tile))
    }
}
