//! # TenPair Solver Library
//!
//! This library provides the core game logic for the TenPair number-matching
//! puzzle and a best-first search solver that finds winning action
//! sequences.
//!
//! It is used by three binaries:
//! - `human_player`: Allows interactive gameplay via the command line.
//! - `ai_solver`: Takes a puzzle file and search limits, then outputs a
//!   sequence of actions that clears the board.
//! - `heuristic_evaluator`: Runs the solver with several weight profiles on
//!   the same puzzle and compares the results.
//!
//! ## Modules
//! - `engine`: Contains the board representation (`Board`), cell types (`Cell`),
//!   game state management (`GameState`), and all game mechanics (matching,
//!   refreshing, row removal).
//! - `solver`: Provides the `solve` and `solve_with_progress` functions for
//!   finding winning action sequences.
//! - `heuristics`: Defines the weighted state evaluation the solver orders
//!   its frontier with, plus a few named weight profiles.
//! - `utils`: Provides utility functions, such as parsing board layouts from
//!   strings.

pub mod engine;
pub mod heuristics;
pub mod solver;
pub mod utils;

// Items from sub-modules like `engine`, `solver`, etc., if public, should be
// accessed via their full path, e.g., `tenpair_solver::solver::solve()`.
// This keeps the top-level library namespace cleaner.
