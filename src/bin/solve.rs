use anyhow::Result;
use clap::Parser;
use log::info;
use serde::Serialize;
use tower_climb::config::SearchLimits;
use tower_climb::driver::{solve_with_breaks, DriverReport};
use tower_climb::prune::PruneConfig;
use tower_climb::puzzles;
use tower_climb::search::{solve, SearchReport};

/// Solve the built-in tower-climb puzzle.
#[derive(Parser, Debug)]
#[command(name = "solve", version, about = "Optimal-path solver for the built-in tower puzzle")]
struct Cli {
    /// Worker threads for the break-point driver (default: CPU count)
    #[arg(long)]
    workers: Option<usize>,
    /// Queue pops before a search gives up
    #[arg(long)]
    max_iterations: Option<u64>,
    /// Accessibility-memo entries kept per worker
    #[arg(long)]
    cache_capacity: Option<usize>,
    /// Disable the heuristic pruning ladder (exhaustive search)
    #[arg(long)]
    no_prune: bool,
    /// Also try removing each break-point wall and keep the best run
    #[arg(long)]
    breaks: bool,
    /// Emit the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Single(SearchReport),
    Driver(DriverReport),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut limits = SearchLimits::default();
    if let Some(workers) = cli.workers {
        limits.workers = workers;
    }
    if let Some(max_iterations) = cli.max_iterations {
        limits.max_iterations = max_iterations;
    }
    if let Some(cache_capacity) = cli.cache_capacity {
        limits.cache_capacity = cache_capacity;
    }
    if cli.no_prune {
        limits.prune = PruneConfig::disabled();
    }

    let config = puzzles::classic();
    let output = if cli.breaks {
        let report = solve_with_breaks(&config, &limits)?;
        info!("{}/{} candidates solved", report.solved, report.candidates);
        Output::Driver(report)
    } else {
        Output::Single(solve(&config, &limits)?)
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &output {
        Output::Single(report) => {
            match &report.solution {
                Some(solution) => print_solution(solution, None),
                None => println!("no solution within the configured limits"),
            }
            println!(
                "searched {} states ({} expanded, {} pruned, {} terminals); cache {}/{} hits",
                report.stats.iterations,
                report.stats.expanded,
                report.stats.pruned,
                report.stats.terminals,
                report.stats.cache_hits,
                report.stats.cache_hits + report.stats.cache_misses,
            );
        }
        Output::Driver(report) => {
            match &report.best {
                Some(best) => print_solution(&best.solution, best.break_point.map(|p| p.to_string())),
                None => println!("no candidate produced a solution"),
            }
            println!("{} of {} candidates solved", report.solved, report.candidates);
        }
    }
    Ok(())
}

fn print_solution(solution: &tower_climb::search::Solution, break_point: Option<String>) {
    if let Some(pos) = break_point {
        println!("best run removes the wall at {pos}");
    }
    let hero = &solution.hero;
    println!(
        "final: HP={}, ATK={}, DEF={}, money={}, keys={}/{}",
        hero.hp, hero.atk, hero.def, hero.money, hero.yellow_keys, hero.blue_keys
    );
    println!(
        "defeated {} monsters, collected {} treasures, {} damaging fights",
        solution.defeated_count, solution.collected_count, solution.fights
    );
    print!("{}", solution.trajectory);
}
