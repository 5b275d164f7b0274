//! Tile vocabulary, state-key layout, and gameplay caps.

/// Walkable floor tile.
pub const TILE_EMPTY: i16 = 0;
/// Impassable wall tile.
pub const TILE_WALL: i16 = 1;

/// Yellow key pickup.
pub const TILE_YELLOW_KEY: i16 = 21;
/// Blue key pickup.
pub const TILE_BLUE_KEY: i16 = 22;
/// Attack +1 pickup.
pub const TILE_ATTACK_GEM: i16 = 27;
/// Defense +1 pickup.
pub const TILE_DEFENSE_GEM: i16 = 28;
/// Hit-points +50 pickup.
pub const TILE_POTION: i16 = 31;

/// Yellow door. Modelled as a 1-HP monster that consumes a yellow key.
pub const YELLOW_DOOR: i16 = 81;
/// Blue door. Modelled as a 1-HP monster that consumes a blue key.
pub const BLUE_DOOR: i16 = 82;

/// Monster tile ids occupy the 2xx range (doors are the exception above).
pub const MONSTER_ID_BASE: i16 = 200;
pub const MONSTER_ID_LIMIT: i16 = 300;

/// Maximum grid edge length the solver accepts.
pub const MAX_GRID_DIM: usize = 64;

/// Damage sentinel for combats the hero cannot win (attack does not
/// exceed the monster's defense).
pub const UNWINNABLE: i16 = 9999;

// State-key layout. Monster-defeated bits sit at the bottom of the key;
// the small counters stack above them with exact widths for their legal
// value ranges, so the packed key is injective.
pub const MONSTER_BITS: u32 = 45;
pub const YELLOW_KEY_SHIFT: u32 = 45;
pub const YELLOW_KEY_BITS: u32 = 3;
pub const BLUE_KEY_SHIFT: u32 = 48;
pub const BLUE_KEY_BITS: u32 = 2;
pub const MONEY_SHIFT: u32 = 50;
pub const MONEY_BITS: u32 = 6;
pub const ATK_BUY_SHIFT: u32 = 56;
pub const DEF_BUY_SHIFT: u32 = 58;
pub const BUY_BITS: u32 = 2;

/// Field caps implied by the key widths. Encoding clamps to these.
pub const MAX_YELLOW_KEYS: i8 = (1 << YELLOW_KEY_BITS) - 1;
pub const MAX_BLUE_KEYS: i8 = (1 << BLUE_KEY_BITS) - 1;
pub const MAX_MONEY: u8 = (1 << MONEY_BITS) - 1;
pub const MAX_BUYS: u8 = (1 << BUY_BITS) - 1;

/// The collected-treasure bitmask is a single `u64`.
pub const MAX_TREASURES: usize = 64;

/// Cost of one attack or defense point at the shop.
pub const SHOP_PRICE: u8 = 40;
