//! Accessibility cache: which regions are reachable under a given
//! defeated-monster mask.
//!
//! Reachability is a pure function of the mask and the start region, so
//! results are memoised by mask. Hit rate here is the primary
//! performance lever of the search; the memo is LRU-bounded to keep a
//! long search from growing without limit.

use crate::graph::RegionGraph;
use crate::state::{has_bit, set_bit};
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use pathfinding::directed::bfs::bfs_reach;
use std::rc::Rc;

/// Fixed-point passes the incremental update will attempt before giving
/// up. Never reached on a well-formed region graph.
const INCREMENTAL_PASS_CAP: u32 = 10;

pub type RegionSet = FnvHashSet<usize>;

struct CacheSlot {
    set: Rc<RegionSet>,
    last_used: u64,
}

pub struct AccessibilityCache {
    /// Monster edge index -> region ids it borders.
    monster_regions: Vec<Vec<usize>>,
    /// Region id -> monster edges bordering it.
    region_monsters: Vec<Vec<usize>>,
    memo: FnvHashMap<u64, CacheSlot>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl AccessibilityCache {
    pub fn new(graph: &RegionGraph, capacity: usize) -> AccessibilityCache {
        AccessibilityCache {
            monster_regions: graph.monsters.iter().map(|m| m.regions.clone()).collect(),
            region_monsters: graph.regions.iter().map(|r| r.monsters.clone()).collect(),
            memo: FnvHashMap::default(),
            capacity: capacity.max(1),
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Full computation: BFS over regions, crossing every defeated
    /// monster edge that borders the frontier.
    pub fn reachable(&mut self, defeated: u64, start_region: usize) -> Rc<RegionSet> {
        if let Some(set) = self.lookup(defeated) {
            return set;
        }
        self.misses += 1;

        let monster_regions = &self.monster_regions;
        let region_monsters = &self.region_monsters;
        let set: RegionSet = bfs_reach(start_region, |&region: &usize| {
            region_monsters[region]
                .iter()
                .filter(|&&m| has_bit(defeated, m))
                .flat_map(|&m| monster_regions[m].iter().copied())
                .collect::<Vec<_>>()
        })
        .collect();

        self.insert(defeated, set)
    }

    /// Incremental update for one additional defeated monster, starting
    /// from the parent state's reachable set.
    ///
    /// The new monster's regions join the set only if one of them was
    /// already reachable; the fixed-point replay afterwards catches
    /// chain effects (a newly opened region may border another defeated
    /// monster that bridges further).
    pub fn reachable_after(
        &mut self,
        base_defeated: u64,
        new_monster: usize,
        base: &RegionSet,
    ) -> Rc<RegionSet> {
        let defeated = set_bit(base_defeated, new_monster);
        if let Some(set) = self.lookup(defeated) {
            return set;
        }
        self.misses += 1;

        let mut set = base.clone();
        if self.monster_regions[new_monster]
            .iter()
            .any(|r| set.contains(r))
        {
            set.extend(self.monster_regions[new_monster].iter().copied());
        }

        let mut changed = true;
        let mut passes = 0;
        while changed && passes < INCREMENTAL_PASS_CAP {
            changed = false;
            passes += 1;
            for (m, regions) in self.monster_regions.iter().enumerate() {
                if !has_bit(defeated, m) {
                    continue;
                }
                if regions.iter().any(|r| set.contains(r)) {
                    for &r in regions {
                        changed |= set.insert(r);
                    }
                }
            }
        }
        if changed {
            warn!(
                "incremental reachability did not converge in {} passes (mask {:#x})",
                INCREMENTAL_PASS_CAP, defeated
            );
        }

        self.insert(defeated, set)
    }

    fn lookup(&mut self, defeated: u64) -> Option<Rc<RegionSet>> {
        self.tick += 1;
        let tick = self.tick;
        let slot = self.memo.get_mut(&defeated)?;
        slot.last_used = tick;
        let set = slot.set.clone();
        self.hits += 1;
        Some(set)
    }

    fn insert(&mut self, defeated: u64, set: RegionSet) -> Rc<RegionSet> {
        if self.memo.len() >= self.capacity {
            if let Some(&oldest) = self
                .memo
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(mask, _)| mask)
            {
                self.memo.remove(&oldest);
            }
        }
        self.tick += 1;
        let set = Rc::new(set);
        self.memo.insert(
            defeated,
            CacheSlot {
                set: set.clone(),
                last_used: self.tick,
            },
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PuzzleConfig;
    use crate::grid::TileGrid;
    use crate::location::Location;
    use crate::model::*;
    use fnv::FnvHashMap;

    // A corridor of three regions chained by two monsters:
    //   region 0 | monster 0 | region 1 | monster 1 | region 2
    fn chain_graph() -> RegionGraph {
        let mut monsters: MonsterTable = FnvHashMap::default();
        monsters.insert(201, MonsterStats { hp: 10, atk: 5, def: 0, money: 0 });
        let config = PuzzleConfig {
            grid: TileGrid::from_rows(&[vec![0, 201, 0, 201, 0]]).unwrap(),
            monsters,
            treasures: FnvHashMap::default(),
            start: Location::from_coords(0, 0),
            end: Location::from_coords(0, 4),
            hero: Hero::new(100, 5, 5, 0, 0, 0),
            requirements: Requirements {
                min_atk: 0,
                min_def: 0,
                min_yellow_keys: 0,
                min_blue_keys: 0,
            },
            stat_range: StatRange { min_atk: 5, max_atk: 5, min_def: 5, max_def: 5 },
        };
        RegionGraph::build(&config).unwrap()
    }

    #[test]
    fn full_computation_walks_defeated_edges_only() {
        let graph = chain_graph();
        let mut cache = AccessibilityCache::new(&graph, 16);

        let none = cache.reachable(0, graph.start_region);
        assert_eq!(none.len(), 1);

        // Only the far monster defeated: its regions stay unreachable.
        let far_only = cache.reachable(0b10, graph.start_region);
        assert_eq!(far_only.len(), 1);

        let both = cache.reachable(0b11, graph.start_region);
        assert_eq!(both.len(), 3);
    }

    #[test]
    fn incremental_matches_full_recomputation() {
        let graph = chain_graph();
        for mask in 0u64..4 {
            for extra in 0..2 {
                if has_bit(mask, extra) {
                    continue;
                }
                let mut a = AccessibilityCache::new(&graph, 16);
                let mut b = AccessibilityCache::new(&graph, 16);
                let base = a.reachable(mask, graph.start_region);
                let incremental = a.reachable_after(mask, extra, &base);
                let full = b.reachable(set_bit(mask, extra), graph.start_region);
                assert_eq!(*incremental, *full, "mask {mask:#b} + monster {extra}");
            }
        }
    }

    #[test]
    fn incremental_catches_chains_through_earlier_kills() {
        let graph = chain_graph();
        let mut cache = AccessibilityCache::new(&graph, 16);
        // Far monster defeated first opens nothing; adding the near one
        // must then bridge all the way through.
        let base = cache.reachable(0b10, graph.start_region);
        let chained = cache.reachable_after(0b10, 0, &base);
        assert_eq!(chained.len(), 3);
    }

    #[test]
    fn evicts_least_recently_used_beyond_capacity() {
        let graph = chain_graph();
        let mut cache = AccessibilityCache::new(&graph, 2);
        cache.reachable(0b00, graph.start_region);
        cache.reachable(0b01, graph.start_region);
        // Touch the first entry so the second becomes the LRU victim.
        cache.reachable(0b00, graph.start_region);
        cache.reachable(0b11, graph.start_region);
        assert_eq!(cache.len(), 2);

        let hits_before = cache.hits();
        cache.reachable(0b00, graph.start_region);
        assert_eq!(cache.hits(), hits_before + 1);
        cache.reachable(0b01, graph.start_region);
        assert_eq!(cache.misses(), 4);
    }
}
