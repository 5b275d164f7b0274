//! Best-first search over canonically-encoded hero states.
//!
//! The engine explores a max-heap of state keys ordered by
//! `HP * 1_000_000 + money * 1_000 - fights`, memoising the best state
//! per key and generating three successor kinds: defeat-monster,
//! buy-attack, and buy-defense. Terminal candidates are recorded and the
//! search keeps going, since a higher-HP arrival at the end may come
//! later.

use crate::access::{AccessibilityCache, RegionSet};
use crate::battle::DamageTable;
use crate::config::{PuzzleConfig, SearchLimits};
use crate::constants::*;
use crate::error::SolverError;
use crate::graph::RegionGraph;
use crate::model::{Hero, Requirements};
use crate::prune::should_prune;
use crate::state::*;
use crate::trajectory::Trajectory;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use serde::Serialize;
use std::collections::BinaryHeap;

/// A queue entry. Ordered by priority, with the key as a deterministic
/// tie-breaker.
#[derive(Copy, Clone, PartialEq, Eq)]
struct QueueEntry {
    priority: i64,
    key: StateKey,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.key.raw().cmp(&other.key.raw()))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The accepted terminal state and its trajectory.
#[derive(Clone, Debug, Serialize)]
pub struct Solution {
    pub hero: Hero,
    pub defeated_count: u32,
    pub collected_count: u32,
    pub fights: u16,
    pub trajectory: Trajectory,
}

/// Progress counters for one search run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchStats {
    pub iterations: u64,
    pub expanded: u64,
    pub enqueued: u64,
    pub pruned: u64,
    pub terminals: u64,
    pub memo_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Outcome of a full search: the best solution (if any terminal was
/// recorded) plus statistics.
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

/// Lexicographic rank used to pick among recorded terminal candidates.
type TerminalRank = (i16, u8, i32);

fn terminal_rank(state: &SearchState) -> TerminalRank {
    (
        state.hero.hp,
        state.hero.money,
        -(state.fights_since_start as i32),
    )
}

pub struct SearchEngine<'a> {
    graph: &'a RegionGraph,
    damage: &'a DamageTable,
    limits: &'a SearchLimits,
    requirements: Requirements,
    initial_hero: Hero,
    initial_power: i16,
    access: AccessibilityCache,
    memo: FnvHashMap<StateKey, SearchState>,
    queue: BinaryHeap<QueueEntry>,
    in_queue: FnvHashSet<StateKey>,
    best_terminal: Option<(StateKey, TerminalRank)>,
    stats: SearchStats,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        graph: &'a RegionGraph,
        damage: &'a DamageTable,
        config: &PuzzleConfig,
        limits: &'a SearchLimits,
    ) -> SearchEngine<'a> {
        SearchEngine {
            graph,
            damage,
            limits,
            requirements: config.requirements,
            initial_hero: config.hero,
            initial_power: config.hero.power(),
            access: AccessibilityCache::new(graph, limits.cache_capacity),
            memo: FnvHashMap::default(),
            queue: BinaryHeap::new(),
            in_queue: FnvHashSet::default(),
            best_terminal: None,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run the search to completion (queue drained or iteration cap).
    /// Returns the best terminal recorded, or `None` on exhaustion.
    pub fn run(&mut self) -> Option<Solution> {
        self.seed_initial();

        loop {
            if self.stats.iterations >= self.limits.max_iterations {
                debug!(
                    "iteration cap {} reached with {} states queued",
                    self.limits.max_iterations,
                    self.queue.len()
                );
                break;
            }
            let Some(entry) = self.queue.pop() else {
                break;
            };
            self.stats.iterations += 1;
            self.in_queue.remove(&entry.key);
            self.expand(entry.key);
        }

        self.stats.memo_entries = self.memo.len();
        self.stats.cache_hits = self.access.hits();
        self.stats.cache_misses = self.access.misses();
        debug!(
            "search complete: iterations={}, expanded={}, pruned={}, terminals={}, memo={}, cache {}/{}",
            self.stats.iterations,
            self.stats.expanded,
            self.stats.pruned,
            self.stats.terminals,
            self.stats.memo_entries,
            self.stats.cache_hits,
            self.stats.cache_hits + self.stats.cache_misses,
        );

        let (terminal_key, _) = self.best_terminal?;
        let state = &self.memo[&terminal_key];
        Some(Solution {
            hero: state.hero,
            defeated_count: count_bits(state.defeated),
            collected_count: count_bits(state.collected),
            fights: state.fights_since_start,
            trajectory: Trajectory::reconstruct(&self.memo, terminal_key),
        })
    }

    /// Build the initial state: everything reachable before the first
    /// combat is swept for treasures immediately.
    fn seed_initial(&mut self) {
        let reachable = self.access.reachable(0, self.graph.start_region);
        let mut state = SearchState::initial(self.initial_hero);
        collect_reachable_treasures(self.graph, &reachable, &mut state.hero, &mut state.collected);
        self.offer(state);
    }

    fn expand(&mut self, key: StateKey) {
        let Some(state) = self.memo.get(&key).cloned() else {
            return;
        };
        self.stats.expanded += 1;

        let reachable = self.access.reachable(state.defeated, self.graph.start_region);

        if should_prune(&self.limits.prune, &state, self.initial_power, &self.requirements) {
            self.stats.pruned += 1;
            return;
        }

        if reachable.contains(&self.graph.end_region) && self.requirements.met_by(&state.hero) {
            self.record_terminal(key, &state);
        }

        for index in 0..self.graph.monsters.len() {
            self.try_fight(key, &state, &reachable, index);
        }
        self.try_buys(key, &state);
    }

    fn record_terminal(&mut self, key: StateKey, state: &SearchState) {
        self.stats.terminals += 1;
        let rank = terminal_rank(state);
        let better = match &self.best_terminal {
            Some((_, best)) => rank > *best,
            None => true,
        };
        if better {
            trace!(
                "terminal candidate {}: HP={}, money={}, fights={}",
                key, state.hero.hp, state.hero.money, state.fights_since_start
            );
            self.best_terminal = Some((key, rank));
        }
    }

    fn try_fight(&mut self, key: StateKey, state: &SearchState, reachable: &RegionSet, index: usize) {
        if has_bit(state.defeated, index) {
            return;
        }
        let edge = &self.graph.monsters[index];
        if !edge.regions.iter().any(|r| reachable.contains(r)) {
            return;
        }
        if edge.tile_id == YELLOW_DOOR && state.hero.yellow_keys <= 0 {
            return;
        }
        if edge.tile_id == BLUE_DOOR && state.hero.blue_keys <= 0 {
            return;
        }
        let damage = self.damage.get(state.hero.atk, state.hero.def, edge.tile_id);
        if damage >= state.hero.hp {
            return;
        }

        let mut hero = state.hero;
        hero.hp -= damage;
        hero.gain_money(edge.stats.money);
        if edge.tile_id == YELLOW_DOOR {
            hero.yellow_keys -= 1;
        } else if edge.tile_id == BLUE_DOOR {
            hero.blue_keys -= 1;
        }

        let defeated = set_bit(state.defeated, index);
        let now_reachable = self.access.reachable_after(state.defeated, index, reachable);

        let mut collected = state.collected;
        collect_reachable_treasures(self.graph, &now_reachable, &mut hero, &mut collected);

        let damaging = damage > 0;
        let consecutive_fights = if hero.power() > state.hero.power() {
            0
        } else if damaging {
            state.consecutive_fights + 1
        } else {
            state.consecutive_fights
        };

        self.offer(SearchState {
            hero,
            defeated,
            collected,
            fights_since_start: state.fights_since_start + damaging as u16,
            consecutive_fights,
            predecessor: Some(key),
            action: Some(Action::Fight { damage, pos: edge.pos }),
        });
    }

    /// Shop successors: 40 money buys one point of attack or defense, at
    /// most three of each per run.
    fn try_buys(&mut self, key: StateKey, state: &SearchState) {
        if state.hero.money < SHOP_PRICE {
            return;
        }
        if state.hero.atk_buys < MAX_BUYS {
            let mut hero = state.hero;
            hero.money -= SHOP_PRICE;
            hero.atk += 1;
            hero.atk_buys += 1;
            self.offer(SearchState {
                hero,
                consecutive_fights: 0,
                predecessor: Some(key),
                action: Some(Action::BuyAttack),
                ..state.clone()
            });
        }
        if state.hero.def_buys < MAX_BUYS {
            let mut hero = state.hero;
            hero.money -= SHOP_PRICE;
            hero.def += 1;
            hero.def_buys += 1;
            self.offer(SearchState {
                hero,
                consecutive_fights: 0,
                predecessor: Some(key),
                action: Some(Action::BuyDefense),
                ..state.clone()
            });
        }
    }

    /// Install a successor in the memo if it beats the incumbent for its
    /// key, enqueueing it unless an entry for the key is already queued.
    fn offer(&mut self, state: SearchState) {
        let key = state.key();
        let priority = state.priority();

        match self.memo.get(&key) {
            Some(incumbent) if priority <= incumbent.priority() => return,
            _ => {}
        }
        self.memo.insert(key, state);
        if self.in_queue.insert(key) {
            self.queue.push(QueueEntry { priority, key });
            self.stats.enqueued += 1;
        }
    }
}

/// Apply every uncollected treasure whose region is reachable, setting
/// its bit so the effect lands exactly once per trajectory.
pub(crate) fn collect_reachable_treasures(
    graph: &RegionGraph,
    reachable: &RegionSet,
    hero: &mut Hero,
    collected: &mut u64,
) {
    for (index, site) in graph.treasures.iter().enumerate() {
        if !has_bit(*collected, index) && reachable.contains(&site.region) {
            hero.apply_treasure(&site.stats);
            *collected = set_bit(*collected, index);
        }
    }
}

/// Validate a puzzle, build its graph and damage table, and run a single
/// search to completion.
pub fn solve(config: &PuzzleConfig, limits: &SearchLimits) -> Result<SearchReport, SolverError> {
    config.validate()?;
    let graph = RegionGraph::build(config)?;
    let damage = DamageTable::build(&config.monsters, &config.stat_range);
    let mut engine = SearchEngine::new(&graph, &damage, config, limits);
    let solution = engine.run();
    Ok(SearchReport {
        solution,
        stats: engine.stats().clone(),
    })
}
