//! Staged pruning oracle.
//!
//! A trajectory that keeps fighting without improving attack + defense is
//! almost never on the optimal line; each stage says how much combined
//! gain a state must show once it has taken a given number of damaging
//! fights. The rules are heuristic and may discard viable branches.

use crate::model::Requirements;
use crate::state::SearchState;
use serde::{Deserialize, Serialize};

/// One rung of the ladder: prune when `fights_since_start` has reached
/// `min_fights` and the attack+defense gain is still at most `max_gain`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneStage {
    pub min_fights: u16,
    pub max_gain: i16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneConfig {
    pub enabled: bool,
    pub stages: Vec<PruneStage>,
    /// Damaging fights without an attack-or-defense gain before the
    /// stalled-progress rule applies.
    pub consecutive_limit: u16,
    /// The stalled-progress rule only fires below this HP.
    pub low_hp_floor: i16,
}

impl Default for PruneConfig {
    fn default() -> Self {
        PruneConfig {
            enabled: true,
            stages: vec![
                PruneStage { min_fights: 7, max_gain: 2 },
                PruneStage { min_fights: 11, max_gain: 4 },
                PruneStage { min_fights: 16, max_gain: 7 },
                PruneStage { min_fights: 21, max_gain: 9 },
                PruneStage { min_fights: 27, max_gain: 12 },
            ],
            consecutive_limit: 5,
            low_hp_floor: 100,
        }
    }
}

impl PruneConfig {
    pub fn disabled() -> Self {
        PruneConfig {
            enabled: false,
            ..PruneConfig::default()
        }
    }
}

/// Decide whether a popped state should be discarded. `initial_power` is
/// the initial hero's attack + defense, captured when the engine was
/// built.
pub fn should_prune(
    config: &PruneConfig,
    state: &SearchState,
    initial_power: i16,
    requirements: &Requirements,
) -> bool {
    if !config.enabled {
        return false;
    }

    let gain = state.hero.power() - initial_power;
    for stage in &config.stages {
        if state.fights_since_start >= stage.min_fights && gain <= stage.max_gain {
            return true;
        }
    }

    // Stalled low on HP while still more than one point short of either
    // required attribute.
    state.consecutive_fights >= config.consecutive_limit
        && state.hero.hp < config.low_hp_floor
        && (state.hero.atk < requirements.min_atk - 1 || state.hero.def < requirements.min_def - 1)
}
