use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tenpair_solver::engine::{
    Action, GameConfig, GameState, DEFAULT_MAX_REFRESHES, DEFAULT_WIDTH,
};
use tenpair_solver::heuristics::HeuristicWeights;
use tenpair_solver::solver::{solve_with_progress, Outcome, SearchMode, SolverConfig};
use tenpair_solver::utils::digits_from_text;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file (digits laid out in rows; whitespace is ignored)
    puzzle_file: PathBuf,

    /// Board width in cells
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Number of refreshes the puzzle starts with
    #[clap(long, default_value_t = DEFAULT_MAX_REFRESHES)]
    max_refreshes: u32,

    /// Cap on generated states before the search gives up
    #[clap(long, default_value_t = 100_000)]
    max_states: usize,

    /// Cap on the length of explored action sequences
    #[clap(long, default_value_t = 200)]
    max_path: usize,

    /// Keep searching for the shortest win instead of stopping at the first
    #[clap(long)]
    shortest: bool,

    /// Override the per-action penalty of the heuristic
    #[clap(long)]
    action_weight: Option<i32>,

    /// Override the per-row penalty of the heuristic
    #[clap(long)]
    row_weight: Option<i32>,

    /// Override the per-refresh penalty of the heuristic
    #[clap(long)]
    refresh_weight: Option<i32>,

    /// Override the per-cleared-cell reward of the heuristic
    #[clap(long)]
    cleared_weight: Option<i32>,

    /// Print a progress line every N generated states (0 disables)
    #[clap(long, default_value_t = 0)]
    progress_every: usize,
}

fn weights_from_args(args: &Args) -> HeuristicWeights {
    let mut weights = HeuristicWeights::default();
    if let Some(w) = args.action_weight {
        weights.action_weight = w;
    }
    if let Some(w) = args.row_weight {
        weights.row_weight = w;
    }
    if let Some(w) = args.refresh_weight {
        weights.refresh_weight = w;
    }
    if let Some(w) = args.cleared_weight {
        weights.cleared_weight = w;
    }
    weights
}

fn read_puzzle_file(path: &PathBuf, config: &GameConfig) -> Result<GameState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read puzzle file {}", path.display()))?;
    let digits = digits_from_text(&content);
    let state = GameState::from_digits(&digits, config)
        .with_context(|| format!("invalid puzzle in {}", path.display()))?;
    Ok(state)
}

/// Replays `actions` from `initial`, printing each position as the action
/// is taken. Matched cells are highlighted in the board they are taken
/// from.
fn print_actions(initial: &GameState, actions: &[Action]) -> Result<()> {
    if actions.is_empty() {
        println!("  No actions needed.");
        return Ok(());
    }
    let mut sim = initial.clone();
    for (i, action) in actions.iter().enumerate() {
        println!("Step {}: {}", i + 1, action);
        let highlight = match *action {
            Action::Match(a, b) => Some((a, b)),
            Action::Refresh => None,
        };
        println!("{}\n", sim.board().to_string_with_highlight(highlight));
        sim.apply_action(*action)
            .with_context(|| format!("step {} does not apply cleanly", i + 1))?;
    }
    println!("Final board state:\n{}\n", sim.board());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let game_config = GameConfig {
        width: args.width,
        max_refreshes: args.max_refreshes,
    };
    let initial = read_puzzle_file(&args.puzzle_file, &game_config)?;

    println!("Loaded puzzle from {}", args.puzzle_file.display());
    println!(
        "Initial board: {} digits over {} rows, {} refreshes available\n{}\n",
        initial.board().digit_count(),
        initial.board().row_count(),
        initial.refresh_budget(),
        initial.board()
    );

    let solver_config = SolverConfig {
        max_search_states: args.max_states,
        max_path_length: args.max_path,
        mode: if args.shortest {
            SearchMode::Shortest
        } else {
            SearchMode::FirstFound
        },
        weights: weights_from_args(&args),
    };
    println!(
        "Searching for {} (up to {} states, paths up to {} actions)...\n",
        match solver_config.mode {
            SearchMode::FirstFound => "the first win",
            SearchMode::Shortest => "the shortest win",
        },
        solver_config.max_search_states,
        solver_config.max_path_length
    );

    let every = args.progress_every;
    let mut last_report = 0usize;
    let report = solve_with_progress(&initial, &solver_config, |progress| {
        if every > 0 && progress.states_searched >= last_report + every {
            last_report = progress.states_searched;
            println!(
                "  ... {} states searched, frontier {}, best score {}",
                progress.states_searched, progress.frontier_len, progress.best_score
            );
        }
    });

    match &report.outcome {
        Outcome::Won { actions } => {
            println!("Solution found ({} actions):\n", actions.len());
            print_actions(&initial, actions)?;
            println!("Board cleared.");
        }
        Outcome::NoSolution => {
            println!("No solution: the starting position allows no action.");
        }
        Outcome::CapReached { best_effort } => {
            println!(
                "Search cap reached before any win. Best line found ({} actions):\n",
                best_effort.len()
            );
            print_actions(&initial, best_effort)?;
        }
        Outcome::Exhausted { best_effort } => {
            println!(
                "Search space exhausted without a win. Best line found ({} actions):\n",
                best_effort.len()
            );
            print_actions(&initial, best_effort)?;
        }
    }

    println!(
        "\nSearched {} states in {:.2?}.",
        report.states_searched, report.elapsed
    );
    Ok(())
}
