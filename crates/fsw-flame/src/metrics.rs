//! Scalar metrics derived from a converged flame.

use crate::config::SolverMode;
use crate::error::{FlameError, FlameResult};
use crate::solution::FlameSolution;
use fsw_core::numeric::argmax_first;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-run summary values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Laminar burning velocity [m/s].
    pub laminar_burning_velocity: f64,
    /// Position of peak temperature [m]; freely-propagating runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flame_length: Option<f64>,
}

/// Derive the laminar burning velocity and flame length of one run.
///
/// The burning velocity is read at the boundary where each configuration
/// defines it: the outlet (last grid point) for a burner-stabilized flame,
/// the unburned inlet (first grid point) for a freely-propagating one.
pub fn compute_metrics(solution: &FlameSolution, mode: &SolverMode) -> FlameResult<DerivedMetrics> {
    let velocity = solution.velocity();
    let boundary = match mode {
        SolverMode::BurnerStabilized { .. } => velocity.last(),
        SolverMode::FreelyPropagating => velocity.first(),
    };
    let laminar_burning_velocity = *boundary.ok_or(FlameError::EmptyProfile)?;

    if laminar_burning_velocity < 0.0 {
        warn!(
            laminar_burning_velocity,
            "negative boundary velocity taken as laminar burning velocity"
        );
    }

    let flame_length = match mode {
        SolverMode::FreelyPropagating => {
            let idx = argmax_first(solution.temperature()).ok_or(FlameError::EmptyProfile)?;
            Some(solution.grid()[idx])
        }
        SolverMode::BurnerStabilized { .. } => None,
    };

    Ok(DerivedMetrics {
        laminar_burning_velocity,
        flame_length,
    })
}
