//! fsw-flame: 1-D premixed flame solver seam for flamesweep.
//!
//! The flame model itself (discretization, kinetics, grid refinement) is an
//! external collaborator reached through the [`FlameSolver`] trait. This crate
//! owns what surrounds it:
//! - solver mode and refinement configuration
//! - validated spatial profiles ([`FlameSolution`])
//! - the [`FlameSolverAdapter`] that checks inputs and invokes a solver once
//! - scalar metric derivation ([`compute_metrics`])
//! - backends: an external-process bridge and a replay store of recorded runs

pub mod config;
pub mod error;
pub mod metrics;
pub mod process;
pub mod replay;
pub mod solution;
pub mod solver;

pub use config::{FlameConfig, ModeKind, RefineCriteria, SolverMode};
pub use error::{FlameError, FlameResult};
pub use metrics::{DerivedMetrics, compute_metrics};
pub use process::ProcessSolver;
pub use replay::{Recording, ReplaySolver};
pub use solution::{FlameProfiles, FlameSolution, ProfilePoint};
pub use solver::{FlameSolver, FlameSolverAdapter};
