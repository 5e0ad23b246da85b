//! Error types for the fsw-app service layer.

use fsw_flame::FlameError;
use fsw_mixture::MixtureError;
use fsw_results::AggregatedDataset;
use std::fmt;
use std::path::PathBuf;

/// Failure of a single sweep run, from whichever stage detected it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Mixture(#[from] MixtureError),

    #[error(transparent)]
    Flame(#[from] FlameError),
}

/// Coarse classification of a [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidMixtureSpec,
    MechanismError,
    SolverDivergence,
    EmptyProfile,
    InvalidProfile,
    InvalidConfig,
    Timeout,
    Backend,
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Mixture(MixtureError::MechanismLoad { .. })
            | RunError::Mixture(MixtureError::UnknownMechanism { .. }) => ErrorKind::MechanismError,
            RunError::Mixture(_) => ErrorKind::InvalidMixtureSpec,
            RunError::Flame(err) => match err {
                FlameError::Mechanism { .. } => ErrorKind::MechanismError,
                FlameError::SolverDivergence { .. } => ErrorKind::SolverDivergence,
                FlameError::EmptyProfile => ErrorKind::EmptyProfile,
                FlameError::InvalidProfile { .. } => ErrorKind::InvalidProfile,
                FlameError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
                FlameError::Timeout { .. } => ErrorKind::Timeout,
                FlameError::Backend { .. } => ErrorKind::Backend,
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidMixtureSpec => "InvalidMixtureSpec",
            ErrorKind::MechanismError => "MechanismError",
            ErrorKind::SolverDivergence => "SolverDivergence",
            ErrorKind::EmptyProfile => "EmptyProfile",
            ErrorKind::InvalidProfile => "InvalidProfile",
            ErrorKind::InvalidConfig => "InvalidConfig",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Backend => "Backend",
        };
        f.write_str(s)
    }
}

/// Application error type shared by the CLI and library callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read sweep config: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write sweep config: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse sweep config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Sweep config validation failed: {0}")]
    Validation(#[from] crate::validate::ValidationError),

    #[error("Mechanism error: {0}")]
    Mechanism(MixtureError),

    /// A run failed under fail-fast. `index` is 1-based, as in progress events.
    /// `partial` holds the rows of every run completed before the failing one.
    #[error("Sweep aborted at run {index} (phi = {phi}): {kind}: {source}")]
    SweepAborted {
        index: usize,
        phi: f64,
        kind: ErrorKind,
        source: RunError,
        partial: Box<AggregatedDataset>,
    },

    #[error("Solver setup failed: {0}")]
    Solver(FlameError),

    #[error("Execution error: {message}")]
    Execution { message: String },

    #[error("Results error: {0}")]
    Results(#[from] fsw_results::ResultsError),

    #[error("Chart error: {0}")]
    Chart(#[from] fsw_chart::ChartError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fsw-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<MixtureError> for AppError {
    fn from(err: MixtureError) -> Self {
        AppError::Mechanism(err)
    }
}
