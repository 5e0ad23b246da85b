//! Result data types.

use fsw_flame::{DerivedMetrics, ModeKind};
use serde::{Deserialize, Serialize};

pub type SweepId = String;

/// One grid sample of one run, tagged with its sweep value and run metrics.
///
/// The metric columns repeat the run's [`DerivedMetrics`] on every row so the
/// table can be charted or exported without a join; [`RunEntry`] holds the
/// canonical per-run values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub run_index: usize,
    pub equivalence_ratio: f64,
    pub position_m: f64,
    pub fuel_mole_fraction: f64,
    pub heat_release_rate_w_m3: f64,
    pub viscosity_pa_s: f64,
    pub temperature_k: f64,
    pub velocity_m_s: f64,
    pub laminar_burning_velocity_m_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flame_length_m: Option<f64>,
}

impl AggregatedRow {
    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics {
            laminar_burning_velocity: self.laminar_burning_velocity_m_s,
            flame_length: self.flame_length_m,
        }
    }
}

/// Per-run entry of the normalized metrics table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub run_index: usize,
    pub equivalence_ratio: f64,
    pub metrics: DerivedMetrics,
    pub first_row: usize,
    pub row_count: usize,
}

impl RunEntry {
    pub fn row_range(&self) -> std::ops::Range<usize> {
        self.first_row..self.first_row + self.row_count
    }
}

/// A sweep value that failed and was left out under skip-and-continue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRun {
    pub index: usize,
    pub equivalence_ratio: f64,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub sweep_id: SweepId,
    pub name: String,
    pub timestamp: String,
    pub mode: ModeKind,
    pub solver: String,
    pub tool_version: String,
    pub runs: Vec<RunEntry>,
    #[serde(default)]
    pub skipped: Vec<SkippedRun>,
    pub row_count: usize,
}

impl SweepManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        sweep_id: impl Into<SweepId>,
        name: impl Into<String>,
        mode: ModeKind,
        solver: impl Into<String>,
        tool_version: impl Into<String>,
    ) -> Self {
        Self {
            sweep_id: sweep_id.into(),
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode,
            solver: solver.into(),
            tool_version: tool_version.into(),
            runs: Vec::new(),
            skipped: Vec::new(),
            row_count: 0,
        }
    }

    pub fn equivalence_ratios(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.equivalence_ratio).collect()
    }
}
