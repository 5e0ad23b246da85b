//! Dataset columns that can be placed on a chart axis.

use fsw_results::AggregatedRow;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartField {
    Position,
    FuelMoleFraction,
    HeatReleaseRate,
    Viscosity,
    Temperature,
    Velocity,
    EquivalenceRatio,
    LaminarBurningVelocity,
    FlameLength,
}

impl ChartField {
    pub const ALL: [ChartField; 9] = [
        ChartField::Position,
        ChartField::FuelMoleFraction,
        ChartField::HeatReleaseRate,
        ChartField::Viscosity,
        ChartField::Temperature,
        ChartField::Velocity,
        ChartField::EquivalenceRatio,
        ChartField::LaminarBurningVelocity,
        ChartField::FlameLength,
    ];

    /// Value of this column on `row`. `None` when the run does not define it.
    pub fn value(self, row: &AggregatedRow) -> Option<f64> {
        match self {
            ChartField::Position => Some(row.position_m),
            ChartField::FuelMoleFraction => Some(row.fuel_mole_fraction),
            ChartField::HeatReleaseRate => Some(row.heat_release_rate_w_m3),
            ChartField::Viscosity => Some(row.viscosity_pa_s),
            ChartField::Temperature => Some(row.temperature_k),
            ChartField::Velocity => Some(row.velocity_m_s),
            ChartField::EquivalenceRatio => Some(row.equivalence_ratio),
            ChartField::LaminarBurningVelocity => Some(row.laminar_burning_velocity_m_s),
            ChartField::FlameLength => row.flame_length_m,
        }
    }

    /// Whether the column holds one value per run rather than per grid point.
    pub fn is_per_run(self) -> bool {
        matches!(
            self,
            ChartField::EquivalenceRatio
                | ChartField::LaminarBurningVelocity
                | ChartField::FlameLength
        )
    }

    /// Default axis label, with SI unit.
    pub fn axis_label(self) -> &'static str {
        match self {
            ChartField::Position => "Position (m)",
            ChartField::FuelMoleFraction => "Fuel mole fraction (-)",
            ChartField::HeatReleaseRate => "Heat release rate (W/m³)",
            ChartField::Viscosity => "Viscosity (Pa·s)",
            ChartField::Temperature => "Temperature (K)",
            ChartField::Velocity => "Velocity (m/s)",
            ChartField::EquivalenceRatio => "Equivalence ratio (-)",
            ChartField::LaminarBurningVelocity => "Laminar burning velocity (m/s)",
            ChartField::FlameLength => "Flame length (m)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ChartField::Position => "position",
            ChartField::FuelMoleFraction => "fuel_mole_fraction",
            ChartField::HeatReleaseRate => "heat_release_rate",
            ChartField::Viscosity => "viscosity",
            ChartField::Temperature => "temperature",
            ChartField::Velocity => "velocity",
            ChartField::EquivalenceRatio => "equivalence_ratio",
            ChartField::LaminarBurningVelocity => "laminar_burning_velocity",
            ChartField::FlameLength => "flame_length",
        }
    }
}

impl fmt::Display for ChartField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ChartField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("unknown chart field '{}'", s))
    }
}
