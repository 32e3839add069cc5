use thiserror::Error;

/// Failure taxonomy for the optimization engine.
///
/// Every error that crosses the API boundary carries a stable `kind()` tag
/// so callers can dispatch on failure class without parsing messages.
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Malformed input, caught by validation before any solving happens.
    #[error("invalid constraints: {0}")]
    InvalidConstraint(String),

    /// The solver proved that no feasible assignment exists.
    #[error("no feasible squad: {0}")]
    Infeasible(String),

    /// The bounded-time solve did not converge to a proven optimum.
    #[error("solver exceeded time budget of {budget_ms} ms")]
    SolverTimeout { budget_ms: u64 },

    /// A captain or transfer lookup matched nothing.
    #[error("empty candidate set: {0}")]
    EmptyCandidateSet(String),
}

impl OptimizerError {
    /// Stable machine-readable tag for the JSON boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizerError::InvalidConstraint(_) => "invalid_constraint",
            OptimizerError::Infeasible(_) => "infeasible_constraints",
            OptimizerError::SolverTimeout { .. } => "solver_timeout",
            OptimizerError::EmptyCandidateSet(_) => "empty_candidate_set",
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
