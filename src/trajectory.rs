//! Trajectory reconstruction and replay.
//!
//! The search stores, per state, the key of its predecessor and the
//! action that produced it. Reconstruction walks those links backwards
//! from the accepted terminal; replay runs the action list forwards
//! against the same tables to re-derive the final hero independently of
//! the memo snapshots.

use crate::access::AccessibilityCache;
use crate::battle::DamageTable;
use crate::config::PuzzleConfig;
use crate::constants::*;
use crate::graph::RegionGraph;
use crate::model::Hero;
use crate::search::collect_reachable_treasures;
use crate::state::*;
use fnv::FnvHashMap;
use serde::Serialize;
use std::fmt;

/// The ordered action list from the initial state to a terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Trajectory {
    pub steps: Vec<Action>,
}

impl Trajectory {
    /// Walk predecessor keys from `terminal` back through the memo,
    /// stopping at a state with no action or no predecessor, and return
    /// the actions in forward order.
    pub(crate) fn reconstruct(
        memo: &FnvHashMap<StateKey, SearchState>,
        terminal: StateKey,
    ) -> Trajectory {
        let mut steps = Vec::new();
        let mut key = terminal;
        while let Some(state) = memo.get(&key) {
            let Some(action) = state.action else {
                break;
            };
            steps.push(action);
            match state.predecessor {
                Some(predecessor) => key = predecessor,
                None => break,
            }
        }
        steps.reverse();
        Trajectory { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The `(damage, packed-position)` wire encoding of every step.
    pub fn encoded(&self) -> Vec<(i16, i16)> {
        self.steps.iter().map(Action::encoded).collect()
    }

    /// Re-apply the action list from the puzzle's initial state. Returns
    /// the resulting hero, or `None` if any step is illegal (unreachable
    /// monster, missing key, unaffordable purchase, lethal damage),
    /// which would mean the trajectory and the puzzle disagree.
    pub fn replay(&self, config: &PuzzleConfig, graph: &RegionGraph) -> Option<Hero> {
        let damage_table = DamageTable::build(&config.monsters, &config.stat_range);
        let mut access = AccessibilityCache::new(graph, self.steps.len().max(1) * 2);

        let mut hero = config.hero;
        let mut defeated = 0u64;
        let mut collected = 0u64;
        let mut reachable = access.reachable(0, graph.start_region);
        collect_reachable_treasures(graph, &reachable, &mut hero, &mut collected);

        for action in &self.steps {
            match action {
                Action::Fight { pos, .. } => {
                    let index = graph.monsters.iter().position(|m| m.pos == *pos)?;
                    if has_bit(defeated, index) {
                        return None;
                    }
                    let edge = &graph.monsters[index];
                    if !edge.regions.iter().any(|r| reachable.contains(r)) {
                        return None;
                    }
                    if edge.tile_id == YELLOW_DOOR {
                        if hero.yellow_keys <= 0 {
                            return None;
                        }
                        hero.yellow_keys -= 1;
                    } else if edge.tile_id == BLUE_DOOR {
                        if hero.blue_keys <= 0 {
                            return None;
                        }
                        hero.blue_keys -= 1;
                    }
                    let damage = damage_table.get(hero.atk, hero.def, edge.tile_id);
                    if damage >= hero.hp {
                        return None;
                    }
                    hero.hp -= damage;
                    hero.gain_money(edge.stats.money);
                    reachable = access.reachable_after(defeated, index, &reachable);
                    defeated = set_bit(defeated, index);
                    collect_reachable_treasures(graph, &reachable, &mut hero, &mut collected);
                }
                Action::BuyAttack => {
                    if hero.money < SHOP_PRICE || hero.atk_buys >= MAX_BUYS {
                        return None;
                    }
                    hero.money -= SHOP_PRICE;
                    hero.atk += 1;
                    hero.atk_buys += 1;
                }
                Action::BuyDefense => {
                    if hero.money < SHOP_PRICE || hero.def_buys >= MAX_BUYS {
                        return None;
                    }
                    hero.money -= SHOP_PRICE;
                    hero.def += 1;
                    hero.def_buys += 1;
                }
            }
        }
        Some(hero)
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return writeln!(f, "no combat needed");
        }
        for (number, action) in self.steps.iter().enumerate() {
            match action {
                Action::Fight { damage, pos } => {
                    writeln!(f, "{}. fight at {}, lost {} HP", number + 1, pos, damage)?
                }
                Action::BuyAttack => writeln!(f, "{}. buy +1 attack", number + 1)?,
                Action::BuyDefense => writeln!(f, "{}. buy +1 defense", number + 1)?,
            }
        }
        Ok(())
    }
}
