//! Break-point driver: fan a search out over every wall-removal
//! candidate and keep the best run.
//!
//! Tasks are independent and share only read-only inputs, so the pool is
//! a plain single-producer / multi-consumer fan-out: a bounded task
//! channel feeds the workers, results drain through a channel into an
//! aggregator that updates the best-so-far under a mutex, and the driver
//! joins everything before reading the answer.

use crate::config::{PuzzleConfig, SearchLimits};
use crate::error::SolverError;
use crate::graph::{enumerate_break_points, BreakPoint, RegionGraph};
use crate::location::Location;
use crate::search::{solve, Solution};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::*;
use serde::Serialize;
use std::sync::Mutex;

/// One finished candidate: which wall was removed (`None` for the
/// unmodified map) and the solution found.
#[derive(Clone, Debug, Serialize)]
pub struct DriverResult {
    pub break_point: Option<Location>,
    pub solution: Solution,
}

/// Outcome of a full driver run.
#[derive(Clone, Debug, Serialize)]
pub struct DriverReport {
    pub best: Option<DriverResult>,
    /// Candidates attempted (the base map plus each break point).
    pub candidates: usize,
    /// Candidates that produced a solution.
    pub solved: usize,
}

fn rank(result: &DriverResult) -> (i16, u8, i32) {
    (
        result.solution.hero.hp,
        result.solution.hero.money,
        -(result.solution.fights as i32),
    )
}

/// Solve the puzzle as-is and with each break-point wall removed,
/// returning the candidate with the highest final HP (money and fewest
/// fights break ties).
pub fn solve_with_breaks(
    config: &PuzzleConfig,
    limits: &SearchLimits,
) -> Result<DriverReport, SolverError> {
    config.validate()?;
    let base_graph = RegionGraph::build(config)?;
    let break_points = enumerate_break_points(config, &base_graph);

    let tasks: Vec<Option<BreakPoint>> = std::iter::once(None)
        .chain(break_points.into_iter().map(Some))
        .collect();
    let candidates = tasks.len();
    let workers = candidates.min(limits.workers.max(1)).min(num_cpus::get());
    info!("driver: {} candidates across {} workers", candidates, workers);

    let best: Mutex<Option<DriverResult>> = Mutex::new(None);
    let mut solved = 0usize;

    let (task_tx, task_rx): (Sender<Option<BreakPoint>>, Receiver<Option<BreakPoint>>) =
        bounded(candidates);
    let (result_tx, result_rx): (Sender<DriverResult>, Receiver<DriverResult>) =
        bounded(candidates);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    run_candidate(config, limits, task, &result_tx);
                }
            });
        }
        drop(task_rx);
        drop(result_tx);

        let aggregator = scope.spawn(|| {
            let mut solved = 0usize;
            while let Ok(result) = result_rx.recv() {
                solved += 1;
                let mut best = best.lock().unwrap();
                let better = match &*best {
                    Some(current) => rank(&result) > rank(current),
                    None => true,
                };
                if better {
                    *best = Some(result);
                }
            }
            solved
        });

        for task in tasks {
            // Workers outlive the sends; a failure here means they all
            // panicked, which propagates at scope exit anyway.
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        solved = aggregator.join().unwrap_or(0);
    });

    Ok(DriverReport {
        best: best.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        candidates,
        solved,
    })
}

/// Run one candidate search. Per-task errors (a rebuilt map that fails
/// validation) are logged and treated as "no solution for this
/// candidate".
fn run_candidate(
    config: &PuzzleConfig,
    limits: &SearchLimits,
    task: Option<BreakPoint>,
    results: &Sender<DriverResult>,
) {
    let break_point = task.as_ref().map(|bp| bp.pos);
    let candidate = match &task {
        Some(bp) => config.with_wall_removed(bp.pos),
        None => config.clone(),
    };
    match solve(&candidate, limits) {
        Ok(report) => {
            if let Some(solution) = report.solution {
                debug!(
                    "candidate {:?}: HP={} after {} iterations",
                    break_point.map(|p| p.to_string()),
                    solution.hero.hp,
                    report.stats.iterations
                );
                let _ = results.send(DriverResult { break_point, solution });
            }
        }
        Err(error) => {
            warn!("candidate {:?} failed: {}", break_point.map(|p| p.to_string()), error);
        }
    }
}
