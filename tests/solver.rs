//! End-to-end scenarios for the solver: the shipped reference puzzle,
//! small constructed instances for each mechanic, and the cross-module
//! invariants (region partition, accessibility monotonicity, trajectory
//! replay, pruning soundness).

use fnv::FnvHashMap;
use tower_climb::access::AccessibilityCache;
use tower_climb::config::{PuzzleConfig, SearchLimits};
use tower_climb::driver::solve_with_breaks;
use tower_climb::error::SolverError;
use tower_climb::graph::RegionGraph;
use tower_climb::location::Location;
use tower_climb::model::*;
use tower_climb::puzzles;
use tower_climb::search::{solve, Solution};
use tower_climb::state::{has_bit, set_bit, Action};

fn treasure_table() -> TreasureTable {
    let mut treasures: TreasureTable = FnvHashMap::default();
    treasures.insert(27, TreasureStats { kind: TreasureKind::AttackGem, value: 1 });
    treasures.insert(28, TreasureStats { kind: TreasureKind::DefenseGem, value: 1 });
    treasures.insert(31, TreasureStats { kind: TreasureKind::Potion, value: 50 });
    treasures.insert(21, TreasureStats { kind: TreasureKind::YellowKey, value: 1 });
    treasures.insert(22, TreasureStats { kind: TreasureKind::BlueKey, value: 1 });
    treasures
}

fn monster_table(extra: &[(i16, MonsterStats)]) -> MonsterTable {
    let mut monsters: MonsterTable = FnvHashMap::default();
    monsters.insert(81, MonsterStats { hp: 1, atk: 0, def: 0, money: 0 });
    monsters.insert(82, MonsterStats { hp: 1, atk: 0, def: 0, money: 0 });
    for &(id, stats) in extra {
        monsters.insert(id, stats);
    }
    monsters
}

fn puzzle(
    rows: &[Vec<i16>],
    start: (u32, u32),
    end: (u32, u32),
    hero: Hero,
    extra_monsters: &[(i16, MonsterStats)],
) -> PuzzleConfig {
    PuzzleConfig {
        grid: tower_climb::grid::TileGrid::from_rows(rows).unwrap(),
        monsters: monster_table(extra_monsters),
        treasures: treasure_table(),
        start: Location::from_coords(start.0, start.1),
        end: Location::from_coords(end.0, end.1),
        hero,
        requirements: Requirements {
            min_atk: 0,
            min_def: 0,
            min_yellow_keys: 0,
            min_blue_keys: 0,
        },
        stat_range: StatRange {
            min_atk: hero.atk,
            max_atk: hero.atk + 6,
            min_def: hero.def,
            max_def: hero.def + 6,
        },
    }
}

fn assert_replay_matches(config: &PuzzleConfig, solution: &Solution) {
    let graph = RegionGraph::build(config).unwrap();
    let replayed = solution
        .trajectory
        .replay(config, &graph)
        .expect("trajectory must replay cleanly");
    assert_eq!(replayed, solution.hero);
}

#[test]
fn trivial_map_needs_no_actions() {
    let rows = vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]];
    let config = puzzle(&rows, (0, 0), (2, 2), Hero::new(77, 5, 5, 0, 0, 0), &[]);
    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.unwrap();
    assert!(solution.trajectory.is_empty());
    assert_eq!(solution.hero.hp, 77);
    assert_eq!(solution.defeated_count, 0);
    assert_replay_matches(&config, &solution);
}

#[test]
fn single_monster_costs_the_precomputed_damage() {
    let rows = vec![vec![0, 201, 0]];
    let monster = MonsterStats { hp: 48, atk: 18, def: 2, money: 0 };
    let config = puzzle(&rows, (0, 0), (0, 2), Hero::new(160, 9, 5, 0, 0, 0), &[(201, monster)]);
    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.unwrap();
    // (ceil(48 / 7) - 1) * 13 = 78
    assert_eq!(solution.trajectory.len(), 1);
    assert_eq!(
        solution.trajectory.steps[0],
        Action::Fight { damage: 78, pos: Location::from_coords(0, 1) }
    );
    assert_eq!(solution.hero.hp, 82);
    assert_eq!(solution.fights, 1);
    assert_replay_matches(&config, &solution);
}

#[test]
fn yellow_door_spends_the_key_and_opens_the_pocket() {
    let rows = vec![vec![0, 81, 31]];
    let config = puzzle(&rows, (0, 0), (0, 2), Hero::new(100, 5, 5, 1, 0, 0), &[]);
    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.unwrap();
    assert_eq!(solution.trajectory.len(), 1);
    assert_eq!(
        solution.trajectory.steps[0],
        Action::Fight { damage: 0, pos: Location::from_coords(0, 1) }
    );
    assert_eq!(solution.hero.yellow_keys, 0);
    assert_eq!(solution.hero.hp, 150);
    assert_eq!(solution.fights, 0);
    assert_replay_matches(&config, &solution);
}

#[test]
fn door_without_a_key_blocks_the_route() {
    let rows = vec![vec![0, 82, 0]];
    let config = puzzle(&rows, (0, 0), (0, 2), Hero::new(100, 5, 5, 0, 0, 0), &[]);
    let report = solve(&config, &SearchLimits::default()).unwrap();
    assert!(report.solution.is_none());
}

#[test]
fn attack_threshold_forces_a_shop_purchase() {
    let rows = vec![vec![0, 201, 0]];
    let monster = MonsterStats { hp: 10, atk: 0, def: 0, money: 40 };
    let mut config = puzzle(&rows, (0, 0), (0, 2), Hero::new(100, 5, 5, 0, 0, 0), &[(201, monster)]);
    config.requirements.min_atk = 6;

    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.unwrap();
    let buys: Vec<_> = solution
        .trajectory
        .steps
        .iter()
        .filter(|a| matches!(a, Action::BuyAttack))
        .collect();
    assert_eq!(buys.len(), 1);
    assert!(solution.trajectory.encoded().contains(&(-1, -1)));
    assert_eq!(solution.hero.atk, 6);
    assert_eq!(solution.hero.money, 0);
    assert_eq!(solution.hero.atk_buys, 1);
    assert_replay_matches(&config, &solution);
}

#[test]
fn walled_off_end_needs_the_break_point_driver() {
    let rows = vec![vec![0, 1, 0]];
    let config = puzzle(&rows, (0, 0), (0, 2), Hero::new(100, 5, 5, 0, 0, 0), &[]);

    let base = solve(&config, &SearchLimits::default()).unwrap();
    assert!(base.solution.is_none());

    let report = solve_with_breaks(&config, &SearchLimits::default()).unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.solved, 1);
    let best = report.best.unwrap();
    assert_eq!(best.break_point, Some(Location::from_coords(0, 1)));
    assert_eq!(best.solution.hero.hp, 100);
    assert!(best.solution.trajectory.is_empty());
}

#[test]
fn unprofitable_monster_chain_is_pruned() {
    // Eight damaging monsters between start and end, no gems anywhere:
    // after seven fights the attack+defense gain is still zero, so the
    // ladder cuts the line before the eighth fight.
    let mut row = vec![0i16];
    for _ in 0..8 {
        row.push(211);
        row.push(0);
    }
    let monster = MonsterStats { hp: 10, atk: 6, def: 0, money: 0 };
    let end = (0, row.len() as u32 - 1);
    let rows = vec![row];
    let config = puzzle(&rows, (0, 0), end, Hero::new(500, 5, 5, 0, 0, 0), &[(211, monster)]);

    let pruned = solve(&config, &SearchLimits::default()).unwrap();
    assert!(pruned.solution.is_none());

    let exhaustive = solve(&config, &SearchLimits::unpruned()).unwrap();
    let solution = exhaustive.solution.unwrap();
    assert_eq!(solution.fights, 8);
    assert_eq!(solution.hero.hp, 500 - 8);
    assert_replay_matches(&config, &solution);
}

#[test]
fn classic_puzzle_partitions_every_walkable_tile() {
    let config = puzzles::classic();
    let graph = RegionGraph::build(&config).unwrap();

    let mut walkable = 0usize;
    let mut treasure_tiles = 0usize;
    for pos in config.grid.positions() {
        let id = config.grid.get(pos);
        if id != 1 && !config.monsters.contains_key(&id) {
            walkable += 1;
        }
        if config.treasures.contains_key(&id) {
            treasure_tiles += 1;
        }
    }

    let region_tiles: usize = graph.regions.iter().map(|r| r.tiles.len()).sum();
    assert_eq!(region_tiles, walkable);
    assert_eq!(graph.treasures.len(), treasure_tiles);

    // Every tile belongs to exactly one region's position list.
    let mut seen = std::collections::HashSet::new();
    for region in &graph.regions {
        for &tile in &region.tiles {
            assert!(seen.insert(tile), "tile {tile} listed twice");
        }
    }
}

#[test]
fn monster_edges_are_symmetric() {
    let graph = RegionGraph::build(&puzzles::classic()).unwrap();
    for (index, edge) in graph.monsters.iter().enumerate() {
        for &region in &edge.regions {
            assert!(
                graph.regions[region].monsters.contains(&index),
                "region {region} missing edge {index}"
            );
        }
    }
    for region in &graph.regions {
        for &index in &region.monsters {
            assert!(
                graph.monsters[index].regions.contains(&region.id),
                "edge {index} missing region {}",
                region.id
            );
        }
    }
}

/// Four corner regions joined by three monsters, for enumerating masks.
fn cross_graph() -> (PuzzleConfig, RegionGraph) {
    let rows = vec![vec![0, 201, 0], vec![202, 1, 203], vec![0, 1, 0]];
    let monster = MonsterStats { hp: 10, atk: 5, def: 0, money: 0 };
    let config = puzzle(
        &rows,
        (0, 0),
        (2, 2),
        Hero::new(100, 5, 5, 0, 0, 0),
        &[(201, monster), (202, monster), (203, monster)],
    );
    let graph = RegionGraph::build(&config).unwrap();
    assert_eq!(graph.regions.len(), 4);
    assert_eq!(graph.monsters.len(), 3);
    (config, graph)
}

#[test]
fn accessibility_is_monotone_in_the_defeated_mask() {
    let (_, graph) = cross_graph();
    let mut cache = AccessibilityCache::new(&graph, 64);
    for a in 0u64..8 {
        for b in 0u64..8 {
            if a & b != a {
                continue;
            }
            let under_a = cache.reachable(a, graph.start_region);
            let under_b = cache.reachable(b, graph.start_region);
            assert!(
                under_a.iter().all(|r| under_b.contains(r)),
                "mask {a:#b} reaches outside mask {b:#b}"
            );
        }
    }
}

#[test]
fn incremental_update_equals_full_recomputation() {
    let (_, graph) = cross_graph();
    for mask in 0u64..8 {
        for extra in 0..3 {
            if has_bit(mask, extra) {
                continue;
            }
            let mut incremental = AccessibilityCache::new(&graph, 64);
            let mut full = AccessibilityCache::new(&graph, 64);
            let base = incremental.reachable(mask, graph.start_region);
            let stepped = incremental.reachable_after(mask, extra, &base);
            let recomputed = full.reachable(set_bit(mask, extra), graph.start_region);
            assert_eq!(*stepped, *recomputed, "mask {mask:#b} + monster {extra}");
        }
    }
}

#[test]
fn replay_reproduces_the_reported_hero_exactly() {
    // Fights, a door, a gem pocket, monster money, and a forced buy in
    // one corridor.
    let rows = vec![vec![0, 201, 27, 81, 31]];
    let monster = MonsterStats { hp: 48, atk: 18, def: 2, money: 40 };
    let mut config = puzzle(&rows, (0, 0), (0, 4), Hero::new(160, 9, 5, 1, 0, 0), &[(201, monster)]);
    config.requirements.min_atk = 11;

    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.unwrap();
    assert_eq!(solution.hero.atk, 11);
    assert_replay_matches(&config, &solution);
}

#[test]
fn pruning_never_beats_the_exhaustive_answer() {
    // On a map small enough to enumerate, whatever pruning returns must
    // not exceed the exhaustive optimum.
    let rows = vec![vec![0, 201, 31, 202, 0]];
    let weak = MonsterStats { hp: 10, atk: 8, def: 0, money: 0 };
    let strong = MonsterStats { hp: 30, atk: 12, def: 2, money: 0 };
    let config = puzzle(
        &rows,
        (0, 0),
        (0, 4),
        Hero::new(120, 7, 6, 0, 0, 0),
        &[(201, weak), (202, strong)],
    );

    let exhaustive = solve(&config, &SearchLimits::unpruned()).unwrap();
    let pruned = solve(&config, &SearchLimits::default()).unwrap();
    let best_hp = exhaustive.solution.as_ref().map(|s| s.hero.hp);
    if let Some(solution) = pruned.solution {
        assert!(Some(solution.hero.hp) <= best_hp);
    }
}

#[test]
fn capacity_overflows_are_fatal_at_build_time() {
    // 46 monsters exceed the 45 defeated-mask bits.
    let rows = vec![vec![0i16; 46], vec![201i16; 46], vec![0i16; 46]];
    let monster = MonsterStats { hp: 10, atk: 5, def: 0, money: 0 };
    let config = puzzle(&rows, (0, 0), (2, 0), Hero::new(100, 5, 5, 0, 0, 0), &[(201, monster)]);
    assert!(matches!(
        RegionGraph::build(&config),
        Err(SolverError::Capacity { kind: "monster", count: 46, .. })
    ));

    // 66 treasures exceed the 64 collected-mask bits.
    let rows = vec![vec![31i16; 33], vec![31i16; 33]];
    let config = puzzle(&rows, (0, 0), (1, 32), Hero::new(100, 5, 5, 0, 0, 0), &[]);
    assert!(matches!(
        RegionGraph::build(&config),
        Err(SolverError::Capacity { kind: "treasure", count: 66, .. })
    ));
}

#[test]
#[ignore = "full reference solve; minutes of work in debug builds"]
fn classic_puzzle_solves_with_replayable_trajectory() {
    let config = puzzles::classic();
    let report = solve(&config, &SearchLimits::default()).unwrap();
    let solution = report.solution.expect("the reference tower is solvable");
    assert!(solution.hero.atk >= 15);
    assert!(solution.hero.def >= 15);
    assert!(solution.hero.hp > 0);
    assert_replay_matches(&config, &solution);
}
