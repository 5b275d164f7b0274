//! Search-state records and the canonical state-key codec.
//!
//! Two states that differ only in hit points, attack, defense, the
//! pruning counters, or predecessor information share the same key; the
//! search memo keeps the best-priority state per key.

use crate::constants::*;
use crate::location::Location;
use crate::model::Hero;
use serde::{Deserialize, Serialize};

#[inline]
pub fn set_bit(mask: u64, index: usize) -> u64 {
    mask | (1 << index)
}

#[inline]
pub fn has_bit(mask: u64, index: usize) -> bool {
    mask & (1 << index) != 0
}

#[inline]
pub fn count_bits(mask: u64) -> u32 {
    mask.count_ones()
}

/// The canonical packed identity of a search position: defeated-monster
/// bits at the bottom, key/money/shop counters above them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StateKey(u64);

impl StateKey {
    /// Pack a defeated mask and the keyed hero counters. Counter fields
    /// clamp to their bit widths; the defeated mask must already fit the
    /// monster-bit capacity (enforced when the region graph is built).
    pub fn encode(defeated: u64, hero: &Hero) -> StateKey {
        debug_assert_eq!(defeated >> MONSTER_BITS, 0);
        let yellow = hero.yellow_keys.clamp(0, MAX_YELLOW_KEYS) as u64;
        let blue = hero.blue_keys.clamp(0, MAX_BLUE_KEYS) as u64;
        let money = hero.money.min(MAX_MONEY) as u64;
        let atk_buys = hero.atk_buys.min(MAX_BUYS) as u64;
        let def_buys = hero.def_buys.min(MAX_BUYS) as u64;
        StateKey(
            defeated
                | yellow << YELLOW_KEY_SHIFT
                | blue << BLUE_KEY_SHIFT
                | money << MONEY_SHIFT
                | atk_buys << ATK_BUY_SHIFT
                | def_buys << DEF_BUY_SHIFT,
        )
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Unpack the key fields (for diagnostics and codec tests).
    pub fn decode(self) -> KeyFields {
        let field = |shift: u32, bits: u32| ((self.0 >> shift) & ((1 << bits) - 1)) as u8;
        KeyFields {
            defeated: self.0 & ((1 << MONSTER_BITS) - 1),
            yellow_keys: field(YELLOW_KEY_SHIFT, YELLOW_KEY_BITS),
            blue_keys: field(BLUE_KEY_SHIFT, BLUE_KEY_BITS),
            money: field(MONEY_SHIFT, MONEY_BITS),
            atk_buys: field(ATK_BUY_SHIFT, BUY_BITS),
            def_buys: field(DEF_BUY_SHIFT, BUY_BITS),
        }
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Unpacked view of a [`StateKey`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyFields {
    pub defeated: u64,
    pub yellow_keys: u8,
    pub blue_keys: u8,
    pub money: u8,
    pub atk_buys: u8,
    pub def_buys: u8,
}

/// One step of a trajectory. Fights carry the precomputed damage and the
/// monster's tile position; shop purchases are positionless.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Fight { damage: i16, pos: Location },
    BuyAttack,
    BuyDefense,
}

impl Action {
    /// The `(damage, packed-position)` wire pair: fights use the real
    /// values, purchases use the `(-1, -1)` / `(-2, -2)` sentinels.
    pub fn encoded(&self) -> (i16, i16) {
        match self {
            Action::Fight { damage, pos } => (*damage, pos.packed_repr() as i16),
            Action::BuyAttack => (-1, -1),
            Action::BuyDefense => (-2, -2),
        }
    }
}

/// A node of the search space: hero snapshot, progress bitmasks, the
/// pruning counters, and the predecessor link for path reconstruction.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub hero: Hero,
    pub defeated: u64,
    pub collected: u64,
    /// Non-zero-damage combats since the initial state.
    pub fights_since_start: u16,
    /// Damaging combats since the last attack-or-defense gain.
    pub consecutive_fights: u16,
    /// Key of the state this one was generated from; `None` on the
    /// initial state. Links are by key, never by pointer, so memo
    /// replacement cannot dangle.
    pub predecessor: Option<StateKey>,
    /// The action that produced this state; `None` on the initial state.
    pub action: Option<Action>,
}

impl SearchState {
    pub fn initial(hero: Hero) -> Self {
        SearchState {
            hero,
            defeated: 0,
            collected: 0,
            fights_since_start: 0,
            consecutive_fights: 0,
            predecessor: None,
            action: None,
        }
    }

    #[inline]
    pub fn key(&self) -> StateKey {
        StateKey::encode(self.defeated, &self.hero)
    }

    /// Queue ordering scalar: high HP first, then money, then fewest
    /// damaging fights.
    #[inline]
    pub fn priority(&self) -> i64 {
        self.hero.hp as i64 * 1_000_000 + self.hero.money as i64 * 1_000
            - self.fights_since_start as i64
    }
}
