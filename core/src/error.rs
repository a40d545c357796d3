use thiserror::Error;

/// Result type used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a run.
///
/// Numerical degeneracies inside a step are never reported here, they are
/// resolved by the clamp policy of the force evaluator.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejection sampling could not place every particle within its retry budget.
    #[error("system too dense: placed {placed} of {requested} particles, gave up after {tries} tries")]
    TooDense {
        placed: usize,
        requested: usize,
        tries: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation called in the wrong phase of the simulation lifecycle.
    #[error("simulation is {found}, expected {expected}")]
    InvalidPhase {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
