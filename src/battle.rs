//! Damage precomputation.
//!
//! Combat is deterministic: the hero strikes first each round, the
//! monster only hits back on rounds it survives. Precomputing every
//! `(atk, def, monster)` triple turns a combat into a single signed
//! subtraction inside the search loop.

use crate::constants::UNWINNABLE;
use crate::model::{MonsterStats, MonsterTable, StatRange};
use fnv::FnvHashMap;
use itertools::Itertools;

/// HP lost defeating `monster` once with the given hero stats.
///
/// `⌈hp / (atk - def_m)⌉ - 1` surviving rounds, each costing
/// `max(0, atk_m - def)`. Returns [`UNWINNABLE`] when the hero cannot
/// hurt the monster at all.
pub fn compute_damage(atk: i8, def: i8, monster: &MonsterStats) -> i16 {
    let player_damage = atk as i32 - monster.def as i32;
    if player_damage <= 0 {
        return UNWINNABLE;
    }
    let monster_damage = (monster.atk as i32 - def as i32).max(0);
    let rounds = (monster.hp as i32 + player_damage - 1) / player_damage - 1;
    (rounds * monster_damage).min(i16::MAX as i32) as i16
}

/// Dense `(atk, def, monster) -> damage` lookup covering the configured
/// stat ranges. Built once at startup and read-only afterwards.
pub struct DamageTable {
    min_atk: i8,
    min_def: i8,
    atk_span: usize,
    def_span: usize,
    slots: FnvHashMap<i16, usize>,
    monsters: Vec<MonsterStats>,
    table: Vec<i16>,
}

impl DamageTable {
    pub fn build(monsters: &MonsterTable, range: &StatRange) -> DamageTable {
        let atk_span = (range.max_atk as i32 - range.min_atk as i32) as usize + 1;
        let def_span = (range.max_def as i32 - range.min_def as i32) as usize + 1;

        // Slot assignment is sorted by monster id so the table layout is
        // stable across runs.
        let ids: Vec<i16> = monsters.keys().copied().sorted().collect();
        let slots: FnvHashMap<i16, usize> =
            ids.iter().enumerate().map(|(slot, &id)| (id, slot)).collect();
        let stats: Vec<MonsterStats> = ids.iter().map(|id| monsters[id]).collect();

        let mut table = vec![0i16; atk_span * def_span * stats.len()];
        for ai in 0..atk_span {
            let atk = (range.min_atk as i32 + ai as i32) as i8;
            for di in 0..def_span {
                let def = (range.min_def as i32 + di as i32) as i8;
                for (slot, monster) in stats.iter().enumerate() {
                    table[(ai * def_span + di) * stats.len() + slot] =
                        compute_damage(atk, def, monster);
                }
            }
        }

        DamageTable {
            min_atk: range.min_atk,
            min_def: range.min_def,
            atk_span,
            def_span,
            slots,
            monsters: stats,
            table,
        }
    }

    /// Damage lookup. Stats outside the precomputed range (shop
    /// purchases and gems can push attack past `max_atk`) fall back to
    /// the exact formula instead of clamping.
    pub fn get(&self, atk: i8, def: i8, monster_id: i16) -> i16 {
        let Some(&slot) = self.slots.get(&monster_id) else {
            return UNWINNABLE;
        };
        let ai = atk as i32 - self.min_atk as i32;
        let di = def as i32 - self.min_def as i32;
        if ai < 0 || di < 0 || ai as usize >= self.atk_span || di as usize >= self.def_span {
            return compute_damage(atk, def, &self.monsters[slot]);
        }
        self.table[(ai as usize * self.def_span + di as usize) * self.monsters.len() + slot]
    }
}
