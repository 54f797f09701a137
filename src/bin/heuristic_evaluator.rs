use anyhow::{Context, Result};
use clap::Parser;
use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tenpair_solver::engine::{
    GameConfig, GameState, DEFAULT_MAX_REFRESHES, DEFAULT_WIDTH, STARTING_DIGITS,
};
use tenpair_solver::heuristics::named_profiles;
use tenpair_solver::solver::{solve, Outcome, SearchMode, SolverConfig};
use tenpair_solver::utils::digits_from_text;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a puzzle file; omit to evaluate on a seeded random deal
    puzzle_file: Option<PathBuf>,

    /// Seed for the random deal used when no puzzle file is given
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Board width in cells
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Number of refreshes the puzzle starts with
    #[clap(long, default_value_t = DEFAULT_MAX_REFRESHES)]
    max_refreshes: u32,

    /// Cap on generated states per profile
    #[clap(long, default_value_t = 100_000)]
    max_states: usize,

    /// Search for the shortest win instead of the first
    #[clap(long)]
    shortest: bool,
}

struct ProfileResult {
    name: &'static str,
    outcome_label: &'static str,
    won: bool,
    path_len: usize,
    states_searched: usize,
    elapsed: Duration,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        width: args.width,
        max_refreshes: args.max_refreshes,
    };

    let initial = match &args.puzzle_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read puzzle file {}", path.display()))?;
            GameState::from_digits(&digits_from_text(&content), &config)
                .with_context(|| format!("invalid puzzle in {}", path.display()))?
        }
        None => {
            println!(
                "No puzzle file given; dealing {} random digits (seed {}).",
                STARTING_DIGITS, args.seed
            );
            GameState::new_random_with_seed(args.seed, &config)
        }
    };

    let profiles = named_profiles();
    println!(
        "Evaluating {} weight profiles on this board:\n{}\n",
        profiles.len(),
        initial.board()
    );

    let mut results = Vec::new();
    for (name, weights) in profiles {
        let solver_config = SolverConfig {
            max_search_states: args.max_states,
            mode: if args.shortest {
                SearchMode::Shortest
            } else {
                SearchMode::FirstFound
            },
            weights,
            ..SolverConfig::default()
        };
        let report = solve(&initial, &solver_config);
        let (outcome_label, won, path_len) = match &report.outcome {
            Outcome::Won { actions } => ("won", true, actions.len()),
            Outcome::NoSolution => ("no solution", false, 0),
            Outcome::CapReached { best_effort } => ("cap reached", false, best_effort.len()),
            Outcome::Exhausted { best_effort } => ("exhausted", false, best_effort.len()),
        };
        println!(
            "  Profile: {:<14} {:<12} {:>4} actions, {:>8} states, {:.2?}",
            name, outcome_label, path_len, report.states_searched, report.elapsed
        );
        results.push(ProfileResult {
            name,
            outcome_label,
            won,
            path_len,
            states_searched: report.states_searched,
            elapsed: report.elapsed,
        });
    }

    // Rank from worst to best so the recommended profile prints last. A win
    // beats any miss; among wins shorter paths beat longer ones, then fewer
    // states searched; among misses a cheaper run ranks higher.
    results.sort_by(|a, b| match (a.won, b.won) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => b
            .path_len
            .cmp(&a.path_len)
            .then(b.states_searched.cmp(&a.states_searched)),
        (false, false) => b.states_searched.cmp(&a.states_searched),
    });

    println!("\n--- Ranking (best last) ---");
    for result in &results {
        println!(
            "Profile {:<14}: {:<12} {} actions, {} states, {:.2?}",
            result.name, result.outcome_label, result.path_len, result.states_searched,
            result.elapsed
        );
    }
    if let Some(best) = results.last() {
        println!("\nBest profile: {}", best.name);
    }
    Ok(())
}
