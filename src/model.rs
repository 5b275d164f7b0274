//! Core data records: monsters, treasures, the hero, and the win
//! thresholds. All of them are plain value types; the tables they live in
//! are built once and read-only during search.

use crate::constants::*;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

/// Fixed combat attributes of one monster id. Doors are monsters with
/// 1 HP, no attack, and no reward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStats {
    pub hp: i16,
    pub atk: i8,
    pub def: i8,
    pub money: u8,
}

/// Which hero attribute a treasure improves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasureKind {
    Potion,
    AttackGem,
    DefenseGem,
    YellowKey,
    BlueKey,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureStats {
    pub kind: TreasureKind,
    pub value: i8,
}

pub type MonsterTable = FnvHashMap<i16, MonsterStats>;
pub type TreasureTable = FnvHashMap<i16, TreasureStats>;

/// The hero's mutable quantities. Key, money, and shop counters are
/// bounded by the state-key field widths; mutators clamp accordingly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub hp: i16,
    pub atk: i8,
    pub def: i8,
    pub yellow_keys: i8,
    pub blue_keys: i8,
    pub money: u8,
    pub atk_buys: u8,
    pub def_buys: u8,
}

impl Hero {
    pub fn new(hp: i16, atk: i8, def: i8, yellow_keys: i8, blue_keys: i8, money: u8) -> Self {
        Hero {
            hp,
            atk,
            def,
            yellow_keys,
            blue_keys,
            money,
            atk_buys: 0,
            def_buys: 0,
        }
    }

    /// Combined attack + defense, the quantity the pruning ladder tracks.
    #[inline]
    pub fn power(&self) -> i16 {
        self.atk as i16 + self.def as i16
    }

    pub fn apply_treasure(&mut self, treasure: &TreasureStats) {
        match treasure.kind {
            TreasureKind::Potion => self.hp += treasure.value as i16,
            TreasureKind::AttackGem => self.atk += treasure.value,
            TreasureKind::DefenseGem => self.def += treasure.value,
            TreasureKind::YellowKey => {
                self.yellow_keys = (self.yellow_keys + treasure.value).min(MAX_YELLOW_KEYS)
            }
            TreasureKind::BlueKey => {
                self.blue_keys = (self.blue_keys + treasure.value).min(MAX_BLUE_KEYS)
            }
        }
    }

    /// Add a monster reward, saturating at the codec's money cap.
    pub fn gain_money(&mut self, amount: u8) {
        self.money = (self.money as u16 + amount as u16).min(MAX_MONEY as u16) as u8;
    }
}

/// Thresholds a terminal state must meet in addition to standing in the
/// end region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub min_atk: i8,
    pub min_def: i8,
    pub min_yellow_keys: i8,
    pub min_blue_keys: i8,
}

impl Requirements {
    pub fn met_by(&self, hero: &Hero) -> bool {
        hero.atk >= self.min_atk
            && hero.def >= self.min_def
            && hero.yellow_keys >= self.min_yellow_keys
            && hero.blue_keys >= self.min_blue_keys
    }
}

/// The closed attack/defense ranges the damage table precomputes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRange {
    pub min_atk: i8,
    pub max_atk: i8,
    pub min_def: i8,
    pub max_def: i8,
}
