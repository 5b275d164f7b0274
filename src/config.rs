//! Explicit configuration records for a solve.
//!
//! Everything a search needs to know about the world (hero stats, stat
//! ranges, monster and treasure tables) travels in a [`PuzzleConfig`];
//! knobs for a single search live in [`SearchLimits`]. Nothing reads
//! process globals.

use crate::constants::*;
use crate::error::SolverError;
use crate::grid::TileGrid;
use crate::location::Location;
use crate::model::*;
use crate::prune::PruneConfig;

/// One puzzle instance: the grid, its tables, the endpoints, the hero,
/// and the win thresholds. Read-only once a search starts.
#[derive(Clone)]
pub struct PuzzleConfig {
    pub grid: TileGrid,
    pub monsters: MonsterTable,
    pub treasures: TreasureTable,
    pub start: Location,
    pub end: Location,
    pub hero: Hero,
    pub requirements: Requirements,
    pub stat_range: StatRange,
}

impl PuzzleConfig {
    /// Check the table-level invariants that must hold before any graph
    /// or table is built. Structural grid checks (unknown tiles, missing
    /// start/end, capacity) happen during region-graph construction.
    pub fn validate(&self) -> Result<(), SolverError> {
        for id in [YELLOW_DOOR, BLUE_DOOR] {
            if let Some(stats) = self.monsters.get(&id) {
                if stats.hp != 1 || stats.atk != 0 || stats.money != 0 {
                    return Err(SolverError::InvalidDoor { id });
                }
            }
        }

        if self.hero.hp <= 0 {
            return Err(SolverError::AttributeBounds(format!(
                "initial HP {} must be positive",
                self.hero.hp
            )));
        }
        let range = &self.stat_range;
        if range.min_atk > range.max_atk || range.min_def > range.max_def {
            return Err(SolverError::AttributeBounds(format!(
                "empty stat range [{}..{}] x [{}..{}]",
                range.min_atk, range.max_atk, range.min_def, range.max_def
            )));
        }
        if self.hero.atk < range.min_atk
            || self.hero.atk > range.max_atk
            || self.hero.def < range.min_def
            || self.hero.def > range.max_def
        {
            return Err(SolverError::AttributeBounds(format!(
                "initial ATK {} / DEF {} outside the precomputed range",
                self.hero.atk, self.hero.def
            )));
        }
        if self.hero.yellow_keys < 0
            || self.hero.yellow_keys > MAX_YELLOW_KEYS
            || self.hero.blue_keys < 0
            || self.hero.blue_keys > MAX_BLUE_KEYS
            || self.hero.money > MAX_MONEY
        {
            return Err(SolverError::AttributeBounds(
                "initial keys or money exceed their encodable ranges".into(),
            ));
        }
        Ok(())
    }

    /// A copy of this puzzle with one wall knocked out, for break-point
    /// candidates.
    pub fn with_wall_removed(&self, pos: Location) -> PuzzleConfig {
        let mut config = self.clone();
        config.grid = self.grid.with_tile(pos, TILE_EMPTY);
        config
    }
}

/// Per-search resource knobs.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// Queue pops before the search gives up.
    pub max_iterations: u64,
    /// Accessibility-memo entries kept per worker.
    pub cache_capacity: usize,
    pub prune: PruneConfig,
    /// Worker threads for the break-point driver.
    pub workers: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_iterations: 50_000_000,
            cache_capacity: 100_000,
            prune: PruneConfig::default(),
            workers: num_cpus::get(),
        }
    }
}

impl SearchLimits {
    /// Default limits with pruning off (exhaustive mode).
    pub fn unpruned() -> Self {
        SearchLimits {
            prune: PruneConfig::disabled(),
            ..SearchLimits::default()
        }
    }
}
