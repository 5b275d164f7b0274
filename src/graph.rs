//! Map-to-region-graph transformation.
//!
//! The tile grid is folded into regions (maximal connected components of
//! walkable tiles under 4-neighbour adjacency) separated by walls and
//! monsters. Monsters become edges: defeating one permanently merges
//! every region its tile borders. The search never looks at tiles again
//! after this fold.

use crate::config::PuzzleConfig;
use crate::constants::*;
use crate::error::SolverError;
use crate::grid::*;
use crate::location::Location;
use crate::model::{MonsterStats, TreasureStats};
use fnv::{FnvHashMap, FnvHashSet};
use itertools::Itertools;
use log::*;
use std::collections::VecDeque;

/// One treasure pickup, scoped to the region that contains its tile.
/// The index into [`RegionGraph::treasures`] is the treasure's bit in
/// the collected mask.
#[derive(Clone, Debug)]
pub struct TreasureSite {
    pub region: usize,
    pub stats: TreasureStats,
    pub tile_id: i16,
    pub pos: Location,
}

/// One monster tile and the regions it borders. The index into
/// [`RegionGraph::monsters`] is the monster's bit in the defeated mask.
///
/// A monster bordering a single region is still an edge: defeating it
/// opens nothing but remains a legal action (doors guarding in-region
/// treasure pockets rely on this).
#[derive(Clone, Debug)]
pub struct MonsterEdge {
    pub tile_id: i16,
    pub stats: MonsterStats,
    pub pos: Location,
    pub regions: Vec<usize>,
}

/// A maximal connected component of walkable tiles.
#[derive(Clone, Debug)]
pub struct Region {
    pub id: usize,
    pub tiles: Vec<Location>,
    /// Global treasure indices contained in this region.
    pub treasures: Vec<usize>,
    /// Indices of monster edges bordering this region.
    pub monsters: Vec<usize>,
}

/// A wall tile whose removal would merge two or more regions.
#[derive(Clone, Debug)]
pub struct BreakPoint {
    pub pos: Location,
    pub regions: Vec<usize>,
}

/// The folded map: regions, monster edges, treasure sites, and the
/// endpoints' region ids. Built once per puzzle and read-only during
/// search.
pub struct RegionGraph {
    pub regions: Vec<Region>,
    pub monsters: Vec<MonsterEdge>,
    pub treasures: Vec<TreasureSite>,
    pub start_region: usize,
    pub end_region: usize,
    /// Region id per tile, or -1 for walls and monsters.
    pub region_map: GridArray<i32>,
}

impl RegionGraph {
    pub fn build(config: &PuzzleConfig) -> Result<RegionGraph, SolverError> {
        let grid = &config.grid;
        let flags = classify(config)?;

        let mut region_map = GridArray::new(grid.rows(), grid.cols(), -1i32);
        let mut regions: Vec<Region> = Vec::new();
        let mut treasures: Vec<TreasureSite> = Vec::new();
        let mut monster_borders: FnvHashMap<Location, FnvHashSet<usize>> = FnvHashMap::default();
        let mut start_region = None;
        let mut end_region = None;

        // Row-major flood fill. Each unvisited walkable tile seeds the
        // next region id; the BFS records treasures, endpoint hits, and
        // which monster tiles the region touches.
        for seed in grid.positions() {
            if region_map.get(seed) != -1 || !flags.get(seed).is_walkable() {
                continue;
            }
            let id = regions.len();
            let mut region = Region {
                id,
                tiles: Vec::new(),
                treasures: Vec::new(),
                monsters: Vec::new(),
            };

            let mut queue = VecDeque::new();
            region_map.set(seed, id as i32);
            queue.push_back(seed);

            while let Some(pos) = queue.pop_front() {
                region.tiles.push(pos);
                if pos == config.start {
                    start_region = Some(id);
                }
                if pos == config.end {
                    end_region = Some(id);
                }
                let tile = grid.get(pos);
                if flags.get(pos).contains(TileFlags::TREASURE) {
                    region.treasures.push(treasures.len());
                    treasures.push(TreasureSite {
                        region: id,
                        stats: config.treasures[&tile],
                        tile_id: tile,
                        pos,
                    });
                }

                for &(dx, dy) in &NEIGHBORS_4 {
                    let Some(next) = pos.step(dx, dy, grid.rows(), grid.cols()) else {
                        continue;
                    };
                    let next_flags = flags.get(next);
                    if next_flags.contains(TileFlags::MONSTER) {
                        monster_borders.entry(next).or_default().insert(id);
                    } else if next_flags.is_walkable() && region_map.get(next) == -1 {
                        region_map.set(next, id as i32);
                        queue.push_back(next);
                    }
                }
            }
            regions.push(region);
        }

        let start_region = start_region.ok_or(SolverError::NoStart(config.start))?;
        let end_region = end_region.ok_or(SolverError::NoEnd(config.end))?;

        // Materialise monster edges in a stable order (sorted by packed
        // position) so defeated-mask bits mean the same thing on every
        // run.
        let monsters: Vec<MonsterEdge> = monster_borders
            .into_iter()
            .sorted_by_key(|(pos, _)| *pos)
            .map(|(pos, borders)| {
                let tile_id = grid.get(pos);
                MonsterEdge {
                    tile_id,
                    stats: config.monsters[&tile_id],
                    pos,
                    regions: borders.into_iter().sorted().collect(),
                }
            })
            .collect();

        if monsters.len() > MONSTER_BITS as usize {
            return Err(SolverError::Capacity {
                kind: "monster",
                count: monsters.len(),
                max: MONSTER_BITS as usize,
            });
        }
        if treasures.len() > MAX_TREASURES {
            return Err(SolverError::Capacity {
                kind: "treasure",
                count: treasures.len(),
                max: MAX_TREASURES,
            });
        }

        for (index, edge) in monsters.iter().enumerate() {
            for &region in &edge.regions {
                regions[region].monsters.push(index);
            }
        }

        debug!(
            "region graph: {} regions, {} monster edges, {} treasures, start={}, end={}",
            regions.len(),
            monsters.len(),
            treasures.len(),
            start_region,
            end_region
        );

        Ok(RegionGraph {
            regions,
            monsters,
            treasures,
            start_region,
            end_region,
            region_map,
        })
    }
}

/// Classify every tile against the vocabulary and the config tables.
fn classify(config: &PuzzleConfig) -> Result<GridArray<TileFlags>, SolverError> {
    let grid = &config.grid;
    let mut flags = GridArray::new(grid.rows(), grid.cols(), TileFlags::NONE);
    for pos in grid.positions() {
        let id = grid.get(pos);
        let flag = if id == TILE_EMPTY {
            TileFlags::NONE
        } else if id == TILE_WALL {
            TileFlags::WALL
        } else if config.treasures.contains_key(&id) {
            TileFlags::TREASURE
        } else if config.monsters.contains_key(&id) {
            TileFlags::MONSTER
        } else if id == YELLOW_DOOR
            || id == BLUE_DOOR
            || (MONSTER_ID_BASE..MONSTER_ID_LIMIT).contains(&id)
        {
            return Err(SolverError::UndefinedMonster { id, pos });
        } else {
            return Err(SolverError::UnknownTile { id, pos });
        };
        flags.set(pos, flag);
    }
    Ok(flags)
}

/// Enumerate wall tiles bordering two or more distinct regions,
/// deduplicated by the sorted region tuple (the driver only needs one
/// candidate per mergeable pair).
pub fn enumerate_break_points(config: &PuzzleConfig, graph: &RegionGraph) -> Vec<BreakPoint> {
    let grid = &config.grid;
    let mut seen: FnvHashSet<Vec<usize>> = FnvHashSet::default();
    let mut points = Vec::new();

    for pos in grid.positions() {
        if grid.get(pos) != TILE_WALL {
            continue;
        }
        let regions: Vec<usize> = NEIGHBORS_4
            .iter()
            .filter_map(|&(dx, dy)| pos.step(dx, dy, grid.rows(), grid.cols()))
            .filter_map(|next| {
                let id = graph.region_map.get(next);
                (id >= 0).then_some(id as usize)
            })
            .sorted()
            .dedup()
            .collect();
        if regions.len() >= 2 && seen.insert(regions.clone()) {
            points.push(BreakPoint { pos, regions });
        }
    }

    trace!("{} break-point candidates", points.len());
    points
}
