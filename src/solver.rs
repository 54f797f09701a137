use crate::engine::{Action, GameState};
use crate::heuristics::{self, HeuristicWeights};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

/// How the search treats the first win it finds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Return the first winning path that turns up.
    FirstFound,
    /// Keep searching for strictly shorter winning paths until the frontier
    /// or a cap runs out.
    Shortest,
}

/// Caps and tuning for one solver run.
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    /// Hard cap on generated states before the search gives up.
    pub max_search_states: usize,
    /// Paths longer than this are dropped instead of explored.
    pub max_path_length: usize,
    /// Whether to stop at the first win or hunt for shorter ones.
    pub mode: SearchMode,
    /// Weights for ordering the frontier.
    pub weights: HeuristicWeights,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_search_states: 100_000,
            max_path_length: 200,
            mode: SearchMode::FirstFound,
            weights: HeuristicWeights::default(),
        }
    }
}

/// Counters handed to the progress callback, once per popped node.
#[derive(Clone, Copy, Debug)]
pub struct SearchProgress {
    /// States generated so far.
    pub states_searched: usize,
    /// Nodes currently waiting in the frontier.
    pub frontier_len: usize,
    /// Best heuristic score observed so far.
    pub best_score: i32,
    /// Heuristic score of the node being processed.
    pub current_score: i32,
    /// Path length of the node being processed.
    pub current_depth: usize,
}

/// How a solver run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A confirmed winning action sequence.
    Won { actions: Vec<Action> },
    /// The initial state allowed no action at all.
    NoSolution,
    /// A cap cut the search short before any win turned up; the most
    /// promising path seen is carried along.
    CapReached { best_effort: Vec<Action> },
    /// Every reachable state was tried without finding a win.
    Exhausted { best_effort: Vec<Action> },
}

/// Result of one solver run.
#[derive(Clone, Debug)]
pub struct SolveReport {
    /// How the run ended.
    pub outcome: Outcome,
    /// States generated over the whole run.
    pub states_searched: usize,
    /// Wall time the run took.
    pub elapsed: Duration,
}

/// Records the most promising path seen so far and the best confirmed win.
///
/// The best-effort path is the fallback answer when the search is cut off
/// before any win; the shortest win is what shortest mode keeps improving.
#[derive(Clone, Debug)]
pub struct SolutionTracker {
    best_effort: Vec<Action>,
    best_effort_score: i32,
    shortest_win: Option<Vec<Action>>,
}

impl SolutionTracker {
    pub fn new() -> Self {
        SolutionTracker {
            best_effort: Vec::new(),
            best_effort_score: i32::MIN,
            shortest_win: None,
        }
    }

    /// Remembers `path` when `score` ties or beats the best seen. Ties go
    /// to the later path so the tracker follows the freshest line of play.
    pub fn observe(&mut self, score: i32, path: &[Action]) {
        if score >= self.best_effort_score {
            self.best_effort_score = score;
            self.best_effort = path.to_vec();
        }
    }

    /// Remembers `path` when it is strictly shorter than the best win so
    /// far.
    pub fn record_win(&mut self, path: &[Action]) {
        let improves = match &self.shortest_win {
            Some(best) => path.len() < best.len(),
            None => true,
        };
        if improves {
            self.shortest_win = Some(path.to_vec());
        }
    }

    /// The path with the highest heuristic score observed.
    pub fn best_effort(&self) -> &[Action] {
        &self.best_effort
    }

    /// The score attached to the best-effort path.
    pub fn best_effort_score(&self) -> i32 {
        self.best_effort_score
    }

    /// The shortest confirmed winning path, if any win was seen.
    pub fn shortest_win(&self) -> Option<&[Action]> {
        self.shortest_win.as_deref()
    }
}

impl Default for SolutionTracker {
    fn default() -> Self {
        SolutionTracker::new()
    }
}

/// Dedup index over generated states: one canonical state per fingerprint.
#[derive(Debug, Default)]
struct VisitedIndex {
    states: HashMap<u64, GameState>,
}

impl VisitedIndex {
    /// Records `state` unless an equal state is already stored under its
    /// fingerprint. Returns true when the state counts as new. A
    /// fingerprint collision with an unequal state replaces the stored one
    /// and is treated as new.
    fn try_insert(&mut self, state: &GameState) -> bool {
        match self.states.entry(state.fingerprint()) {
            Entry::Occupied(mut entry) => {
                if entry.get() == state {
                    false
                } else {
                    entry.insert(state.clone());
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(state.clone());
                true
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// One frontier entry. The heap orders by score and breaks ties by the
/// insertion sequence, later pushes first, so expansion order is fully
/// deterministic.
#[derive(Clone, Debug)]
struct SearchNode {
    state: GameState,
    history: Vec<Action>,
    score: i32,
    seq: u64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.seq == other.seq
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score).then(self.seq.cmp(&other.seq))
    }
}

/// Searches for a winning action sequence from `initial`.
///
/// Equivalent to [`solve_with_progress`] with a no-op callback.
///
/// # Examples
/// ```
/// use tenpair_solver::engine::{GameConfig, GameState};
/// use tenpair_solver::solver::{solve, Outcome, SolverConfig};
///
/// let state = GameState::from_digits("55", &GameConfig::default()).unwrap();
/// let report = solve(&state, &SolverConfig::default());
/// assert!(matches!(report.outcome, Outcome::Won { .. }));
/// ```
pub fn solve(initial: &GameState, config: &SolverConfig) -> SolveReport {
    solve_with_progress(initial, config, |_| {})
}

/// Searches for a winning action sequence from `initial`, reporting search
/// counters to `on_progress` once per popped node.
///
/// The search is a best-first loop over cloned states: the frontier is a
/// max-heap keyed by the heuristic score, every generated child is deduped
/// against previously seen states, and two hard caps bound the effort. When
/// a confirmed win exists, nodes that cannot possibly beat it (path length
/// plus the admissible lower bound already longer) are discarded unseen.
///
/// # Returns
/// A [`SolveReport`]; see [`Outcome`] for the four ways a run can end.
pub fn solve_with_progress<F>(
    initial: &GameState,
    config: &SolverConfig,
    mut on_progress: F,
) -> SolveReport
where
    F: FnMut(&SearchProgress),
{
    let start = Instant::now();
    let mut frontier = BinaryHeap::new();
    let mut visited = VisitedIndex::default();
    let mut tracker = SolutionTracker::new();
    let mut states_searched = 0usize;
    let mut next_seq = 0u64;
    let mut capped = false;

    frontier.push(SearchNode {
        state: initial.clone(),
        history: Vec::new(),
        score: heuristics::evaluate(initial, &config.weights),
        seq: next_seq,
    });
    next_seq += 1;

    while let Some(node) = frontier.pop() {
        if states_searched > config.max_search_states {
            capped = true;
            break;
        }

        on_progress(&SearchProgress {
            states_searched,
            frontier_len: frontier.len(),
            best_score: tracker.best_effort_score(),
            current_score: node.score,
            current_depth: node.history.len(),
        });

        if node.history.len() > config.max_path_length {
            continue;
        }

        if let Some(win) = tracker.shortest_win() {
            // Cannot end up strictly shorter than the win in hand.
            if node.history.len() + node.state.minimum_matches_remaining() > win.len() {
                continue;
            }
        }

        if node.state.is_won() {
            tracker.record_win(&node.history);
            match config.mode {
                SearchMode::FirstFound => {
                    return SolveReport {
                        outcome: Outcome::Won {
                            actions: node.history,
                        },
                        states_searched,
                        elapsed: start.elapsed(),
                    };
                }
                SearchMode::Shortest => continue,
            }
        }

        for action in node.state.legal_actions() {
            let mut child = node.state.clone();
            child
                .apply_action(action)
                .expect("a generated action must apply to its own state");
            if !visited.try_insert(&child) {
                continue;
            }
            let score = heuristics::evaluate(&child, &config.weights);
            let mut history = node.history.clone();
            history.push(action);
            tracker.observe(score, &history);
            states_searched += 1;
            frontier.push(SearchNode {
                state: child,
                history,
                score,
                seq: next_seq,
            });
            next_seq += 1;
        }
    }

    let outcome = if let Some(win) = tracker.shortest_win() {
        // A confirmed win beats any best-effort fallback, capped or not.
        Outcome::Won {
            actions: win.to_vec(),
        }
    } else if capped {
        Outcome::CapReached {
            best_effort: tracker.best_effort().to_vec(),
        }
    } else if visited.is_empty() {
        // The frontier drained without a single child: the initial state
        // offered no action.
        Outcome::NoSolution
    } else {
        Outcome::Exhausted {
            best_effort: tracker.best_effort().to_vec(),
        }
    };

    SolveReport {
        outcome,
        states_searched,
        elapsed: start.elapsed(),
    }
}
