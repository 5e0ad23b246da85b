//! Flame solver errors.

use fsw_core::CoreError;
use thiserror::Error;

pub type FlameResult<T> = Result<T, FlameError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlameError {
    /// Mixture references data absent from the mechanism.
    #[error("Mechanism error: {message}")]
    Mechanism { message: String },

    /// Solver gave up without converging.
    #[error("Solver divergence: {message}")]
    SolverDivergence { message: String },

    /// Converged result has no grid points.
    #[error("Empty profile: solution grid has zero length")]
    EmptyProfile,

    /// Profile arrays violate the parallel-array contract.
    #[error("Invalid profile: {what}")]
    InvalidProfile { what: String },

    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Solver timed out after {seconds:.1} s")]
    Timeout { seconds: f64 },

    /// Failure talking to the solver backend (spawn, I/O, protocol).
    #[error("Solver backend error: {message}")]
    Backend { message: String },
}

impl From<CoreError> for FlameError {
    fn from(err: CoreError) -> Self {
        FlameError::InvalidProfile {
            what: err.to_string(),
        }
    }
}
