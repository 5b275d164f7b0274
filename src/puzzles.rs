//! Built-in puzzle instances.

use crate::config::PuzzleConfig;
use crate::grid::TileGrid;
use crate::location::Location;
use crate::model::*;
use fnv::FnvHashMap;

/// The 13x13 reference tower: six monster kinds, both door colours, and
/// tight enough thresholds (ATK and DEF must reach 15 from 8) that the
/// route through the gems matters.
pub fn classic() -> PuzzleConfig {
    let rows: Vec<Vec<i16>> = vec![
        vec![31, 1, 27, 0, 203, 0, 0, 1, 0, 202, 0, 81, 27],
        vec![0, 206, 0, 31, 1, 81, 28, 82, 31, 1, 205, 0, 206],
        vec![1, 0, 1, 1, 1, 27, 1, 28, 1, 1, 1, 0, 1],
        vec![28, 202, 0, 27, 1, 203, 0, 203, 0, 1, 0, 201, 0],
        vec![1, 1, 206, 0, 201, 0, 0, 1, 204, 0, 0, 1, 206],
        vec![31, 31, 0, 1, 31, 1, 0, 1, 1, 1, 31, 1, 27],
        vec![1, 81, 1, 1, 1, 1, 206, 31, 206, 81, 0, 1, 31],
        vec![0, 203, 28, 31, 0, 205, 0, 1, 27, 1, 0, 1, 205],
        vec![0, 1, 0, 1, 1, 0, 1, 1, 1, 1, 202, 81, 205],
        vec![202, 1, 82, 28, 202, 0, 201, 0, 31, 1, 0, 1, 0],
        vec![31, 1, 0, 1, 1, 1, 31, 1, 0, 202, 0, 1, 28],
        vec![27, 1, 0, 204, 31, 1, 0, 1, 1, 0, 1, 0, 1],
        vec![0, 201, 0, 1, 31, 203, 0, 1, 31, 201, 0, 201, 28],
    ];

    let mut monsters: MonsterTable = FnvHashMap::default();
    monsters.insert(201, MonsterStats { hp: 50, atk: 19, def: 1, money: 0 });
    monsters.insert(202, MonsterStats { hp: 40, atk: 22, def: 0, money: 0 });
    monsters.insert(203, MonsterStats { hp: 35, atk: 23, def: 3, money: 0 });
    monsters.insert(204, MonsterStats { hp: 44, atk: 17, def: 2, money: 0 });
    monsters.insert(205, MonsterStats { hp: 28, atk: 25, def: 3, money: 0 });
    monsters.insert(206, MonsterStats { hp: 33, atk: 30, def: 1, money: 0 });
    monsters.insert(81, MonsterStats { hp: 1, atk: 0, def: 0, money: 0 });
    monsters.insert(82, MonsterStats { hp: 1, atk: 0, def: 0, money: 0 });

    let mut treasures: TreasureTable = FnvHashMap::default();
    treasures.insert(27, TreasureStats { kind: TreasureKind::AttackGem, value: 1 });
    treasures.insert(28, TreasureStats { kind: TreasureKind::DefenseGem, value: 1 });
    treasures.insert(31, TreasureStats { kind: TreasureKind::Potion, value: 50 });
    treasures.insert(21, TreasureStats { kind: TreasureKind::YellowKey, value: 1 });
    treasures.insert(22, TreasureStats { kind: TreasureKind::BlueKey, value: 1 });

    PuzzleConfig {
        grid: TileGrid::from_rows(&rows).expect("reference grid is well-formed"),
        monsters,
        treasures,
        start: Location::from_coords(11, 6),
        end: Location::from_coords(0, 6),
        hero: Hero::new(240, 8, 8, 0, 0, 0),
        requirements: Requirements {
            min_atk: 15,
            min_def: 15,
            min_yellow_keys: 0,
            min_blue_keys: 0,
        },
        stat_range: StatRange {
            min_atk: 8,
            max_atk: 15,
            min_def: 8,
            max_def: 15,
        },
    }
}
