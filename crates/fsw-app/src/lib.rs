//! Sweep orchestration service for flamesweep.
//!
//! Loads sweep definitions, drives one flame simulation per equivalence ratio,
//! aggregates the results and hands them to storage, export and charting.
//! Shared by the CLI and by library users.

pub mod config;
pub mod controller;
pub mod error;
pub mod progress;
pub mod service;
pub mod sweep;
pub mod validate;

pub use config::{
    FlameDef, FlameModeDef, LATEST_VERSION, MixtureDef, OutputDef, RunDef, SolverDef, SweepConfig,
    load_config, save_config,
};
pub use controller::{Execution, FailurePolicy, SweepController, SweepReport};
pub use error::{AppError, AppResult, ErrorKind, RunError};
pub use progress::SweepProgressEvent;
pub use service::{
    SweepOptions, SweepRequest, SweepResponse, build_solver, export_csv, list_sweeps, load_sweep,
    plot_sweep, run_sweep, run_sweep_with_progress, sweep_id_for,
};
pub use sweep::{SweepDef, SweepRange, SweepSpacing};
pub use validate::{ValidationError, validate_config};
