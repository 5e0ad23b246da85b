//! Sweep configuration file format.

use crate::controller::{Execution, FailurePolicy};
use crate::error::{AppError, AppResult};
use crate::sweep::SweepDef;
use crate::validate::validate_config;
use fsw_chart::ChartRequest;
use fsw_core::units::{constants::ONE_ATM_PA, k, pa};
use fsw_flame::{FlameConfig, ModeKind, RefineCriteria, SolverMode};
use fsw_mixture::MixtureSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LATEST_VERSION: u32 = 1;

/// Top-level sweep definition, as stored in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub version: u32,
    pub name: String,
    /// Built-in mechanism name or path to a mechanism YAML file.
    #[serde(default = "default_mechanism")]
    pub mechanism: String,
    pub mixture: MixtureDef,
    pub sweep: SweepDef,
    pub flame: FlameDef,
    pub solver: SolverDef,
    #[serde(default)]
    pub run: RunDef,
    /// Profile charts; the default set is used when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartRequest>,
    #[serde(default)]
    pub output: OutputDef,
}

fn default_mechanism() -> String {
    "gri30".to_string()
}

fn default_pressure() -> f64 {
    ONE_ATM_PA
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureDef {
    pub fuel: String,
    pub oxidizer: String,
    pub temperature_k: f64,
    #[serde(default = "default_pressure")]
    pub pressure_pa: f64,
}

impl MixtureDef {
    pub fn to_spec(&self) -> MixtureSpec {
        MixtureSpec::new(
            self.fuel.clone(),
            self.oxidizer.clone(),
            k(self.temperature_k),
            pa(self.pressure_pa),
        )
    }
}

/// Burner feed or free flame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlameModeDef {
    /// Exactly one of mass flux or inlet velocity must be given.
    BurnerStabilized {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mass_flux_kg_m2_s: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inlet_velocity_m_s: Option<f64>,
    },
    FreelyPropagating,
}

impl FlameModeDef {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::BurnerStabilized { .. } => ModeKind::BurnerStabilized,
            Self::FreelyPropagating => ModeKind::FreelyPropagating,
        }
    }

    /// Solver mode for a mixture of the given density. An inlet velocity
    /// becomes the mass flux `velocity * density`.
    pub fn solver_mode(&self, density_kg_m3: f64) -> SolverMode {
        match self {
            Self::BurnerStabilized {
                mass_flux_kg_m2_s,
                inlet_velocity_m_s,
            } => {
                let mass_flow_rate = match (mass_flux_kg_m2_s, inlet_velocity_m_s) {
                    (Some(flux), _) => *flux,
                    (None, Some(velocity)) => velocity * density_kg_m3,
                    // rejected by FlameConfig::validate
                    (None, None) => 0.0,
                };
                SolverMode::BurnerStabilized { mass_flow_rate }
            }
            Self::FreelyPropagating => SolverMode::FreelyPropagating,
        }
    }
}

/// Flame settings shared by every run of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameDef {
    pub mode: FlameModeDef,
    #[serde(default)]
    pub refine: RefineCriteria,
    #[serde(default = "default_true")]
    pub refine_grid: bool,
    #[serde(default)]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step_factor: Option<f64>,
}

impl FlameDef {
    pub fn new(mode: FlameModeDef) -> Self {
        Self {
            mode,
            refine: RefineCriteria::default(),
            refine_grid: true,
            auto: false,
            time_step_factor: None,
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn config_for(&self, density_kg_m3: f64) -> FlameConfig {
        FlameConfig {
            mode: self.mode.solver_mode(density_kg_m3),
            refine: self.refine,
            refine_grid: self.refine_grid,
            auto: self.auto,
            time_step_factor: self.time_step_factor,
        }
    }
}

/// Solver backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolverDef {
    /// External program speaking the JSON request/reply protocol.
    Process {
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_s: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<PathBuf>,
    },
    /// Recorded solutions in a directory.
    Replay { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunDef {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub execution: Execution,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_dir: Option<PathBuf>,
    /// Save every converged solution here for later replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_dir: Option<PathBuf>,
}

impl SweepConfig {
    pub fn equivalence_ratios(&self) -> Vec<f64> {
        self.sweep.equivalence_ratios()
    }

    pub fn chart_requests(&self) -> Vec<ChartRequest> {
        if self.charts.is_empty() {
            fsw_chart::default_requests()
        } else {
            self.charts.clone()
        }
    }
}

/// Resolve `path` against the directory of the config file.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// Load and validate a sweep config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<SweepConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: SweepConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &SweepConfig) -> AppResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).map_err(|e| AppError::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
