use crate::engine::GameState;

/// Weights for scoring how promising a puzzle state looks.
///
/// The solver orders its frontier by the score from [`evaluate`], so these
/// four knobs steer which branches get explored first. Higher scores are
/// explored earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeuristicWeights {
    /// Reward per action already taken; pushes the search deeper.
    pub action_weight: i32,
    /// Penalty per remaining board row; fewer rows look closer to a win.
    pub row_weight: i32,
    /// Penalty per refresh spent. Refreshes double the remaining work, so
    /// the default keeps this one large.
    pub refresh_weight: i32,
    /// Reward per cleared placeholder still on the board.
    pub cleared_weight: i32,
}

impl Default for HeuristicWeights {
    /// The tuning the solver ships with: `(3, 10, 50, 1)`.
    fn default() -> Self {
        HeuristicWeights {
            action_weight: 3,
            row_weight: 10,
            refresh_weight: 50,
            cleared_weight: 1,
        }
    }
}

impl HeuristicWeights {
    /// Profile that puts most of the signal on shrinking the board.
    pub fn row_focused() -> Self {
        HeuristicWeights {
            row_weight: 25,
            ..HeuristicWeights::default()
        }
    }

    /// Profile that treats refreshes as close to a last resort.
    pub fn refresh_averse() -> Self {
        HeuristicWeights {
            refresh_weight: 120,
            ..HeuristicWeights::default()
        }
    }

    /// Profile that rewards raw progress (deep paths, many cleared cells)
    /// over board shape.
    pub fn momentum() -> Self {
        HeuristicWeights {
            action_weight: 8,
            cleared_weight: 3,
            ..HeuristicWeights::default()
        }
    }
}

/// Returns the named weight profiles the evaluator binary compares.
///
/// The default tuning comes first; the order is otherwise arbitrary but
/// stable.
pub fn named_profiles() -> Vec<(&'static str, HeuristicWeights)> {
    vec![
        ("default", HeuristicWeights::default()),
        ("row_focused", HeuristicWeights::row_focused()),
        ("refresh_averse", HeuristicWeights::refresh_averse()),
        ("momentum", HeuristicWeights::momentum()),
    ]
}

/// Scores a state for frontier ordering.
///
/// The score is a signed weighted sum: actions taken so far count in favor
/// (deep lines stay attractive), remaining rows and spent refreshes count
/// against, and cleared placeholders count in favor as visible progress.
/// The value regularly goes negative for young positions; only the ordering
/// matters.
///
/// # Arguments
/// * `state`: The state to score.
/// * `weights`: The tuning to score it with.
///
/// # Returns
/// The weighted score as an `i32`; higher means more promising.
pub fn evaluate(state: &GameState, weights: &HeuristicWeights) -> i32 {
    let board = state.board();
    state.actions_taken() as i32 * weights.action_weight
        - board.row_count() as i32 * weights.row_weight
        - state.refreshes_used() as i32 * weights.refresh_weight
        + board.cleared_count() as i32 * weights.cleared_weight
}
