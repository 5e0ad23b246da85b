//! Solver mode and grid refinement settings.

use crate::error::{FlameError, FlameResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flame configuration handed to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SolverMode {
    /// Reactants enter at a fixed mass flux and the flame anchors to the burner.
    BurnerStabilized {
        /// Burner mass flux [kg/(m²·s)].
        mass_flow_rate: f64,
    },
    /// Adiabatic flame whose propagation speed is solved as an eigenvalue.
    FreelyPropagating,
}

/// Mode discriminant without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    BurnerStabilized,
    FreelyPropagating,
}

impl SolverMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::BurnerStabilized { .. } => ModeKind::BurnerStabilized,
            Self::FreelyPropagating => ModeKind::FreelyPropagating,
        }
    }

    pub fn validate(&self) -> FlameResult<()> {
        if let Self::BurnerStabilized { mass_flow_rate } = self
            && (!mass_flow_rate.is_finite() || *mass_flow_rate <= 0.0)
        {
            return Err(FlameError::InvalidConfig {
                what: "burner mass flow rate must be positive and finite",
            });
        }
        Ok(())
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BurnerStabilized => write!(f, "burner-stabilized"),
            Self::FreelyPropagating => write!(f, "freely-propagating"),
        }
    }
}

impl fmt::Display for SolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BurnerStabilized { mass_flow_rate } => {
                write!(f, "burner-stabilized (mdot = {:.4} kg/m²/s)", mass_flow_rate)
            }
            Self::FreelyPropagating => write!(f, "freely-propagating"),
        }
    }
}

/// Adaptive grid refinement criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefineCriteria {
    /// Maximum size ratio between adjacent cells.
    pub ratio: f64,
    /// Maximum relative change of a component between adjacent points.
    pub slope: f64,
    /// Maximum relative change of the slope between adjacent points.
    pub curve: f64,
    /// Threshold below which points may be removed.
    #[serde(default)]
    pub prune: f64,
}

impl Default for RefineCriteria {
    fn default() -> Self {
        Self {
            ratio: 10.0,
            slope: 0.8,
            curve: 0.8,
            prune: 0.0,
        }
    }
}

impl RefineCriteria {
    pub fn validate(&self) -> FlameResult<()> {
        if !self.ratio.is_finite() || self.ratio < 2.0 {
            return Err(FlameError::InvalidConfig {
                what: "refine ratio must be at least 2",
            });
        }
        if !(self.slope > 0.0 && self.slope <= 1.0) {
            return Err(FlameError::InvalidConfig {
                what: "refine slope must be in (0, 1]",
            });
        }
        if !(self.curve > 0.0 && self.curve <= 1.0) {
            return Err(FlameError::InvalidConfig {
                what: "refine curve must be in (0, 1]",
            });
        }
        if !(self.prune >= 0.0 && self.prune < self.slope.min(self.curve)) {
            return Err(FlameError::InvalidConfig {
                what: "refine prune must be non-negative and below slope and curve",
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Everything the solver needs besides the mixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameConfig {
    pub mode: SolverMode,
    #[serde(default)]
    pub refine: RefineCriteria,
    /// Enable adaptive grid refinement.
    #[serde(default = "default_true")]
    pub refine_grid: bool,
    /// Let the solver pick its own staged solution strategy.
    #[serde(default)]
    pub auto: bool,
    /// Time-step relaxation factor for the pseudo-transient stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step_factor: Option<f64>,
}

impl FlameConfig {
    pub fn new(mode: SolverMode) -> Self {
        Self {
            mode,
            refine: RefineCriteria::default(),
            refine_grid: true,
            auto: false,
            time_step_factor: None,
        }
    }

    pub fn with_refine(mut self, refine: RefineCriteria) -> Self {
        self.refine = refine;
        self
    }

    pub fn with_time_step_factor(mut self, factor: f64) -> Self {
        self.time_step_factor = Some(factor);
        self
    }

    pub fn validate(&self) -> FlameResult<()> {
        self.mode.validate()?;
        self.refine.validate()?;
        if let Some(factor) = self.time_step_factor
            && !(factor.is_finite() && factor > 0.0)
        {
            return Err(FlameError::InvalidConfig {
                what: "time step factor must be positive and finite",
            });
        }
        Ok(())
    }
}
