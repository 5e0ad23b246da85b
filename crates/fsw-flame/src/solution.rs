//! Converged spatial profiles of one flame run.

use crate::error::{FlameError, FlameResult};
use fsw_core::numeric::is_strictly_increasing;
use serde::{Deserialize, Serialize};

/// Raw profile arrays as exchanged with solver backends.
///
/// No invariants are enforced on this form; convert into [`FlameSolution`]
/// to validate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlameProfiles {
    /// Grid positions [m].
    pub grid: Vec<f64>,
    /// Fuel mole fraction [-].
    pub fuel_mole_fraction: Vec<f64>,
    /// Volumetric heat release rate [W/m³].
    pub heat_release_rate: Vec<f64>,
    /// Dynamic viscosity [Pa·s].
    pub viscosity: Vec<f64>,
    /// Temperature [K].
    pub temperature: Vec<f64>,
    /// Axial flow velocity [m/s].
    pub velocity: Vec<f64>,
}

/// One grid sample across all profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub position: f64,
    pub fuel_mole_fraction: f64,
    pub heat_release_rate: f64,
    pub viscosity: f64,
    pub temperature: f64,
    pub velocity: f64,
}

/// Validated profiles: every array has exactly `grid.len()` entries, all values
/// are finite and the grid is strictly increasing.
///
/// The arrays are only reachable as shared slices, so they cannot be trimmed
/// or reordered independently.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameSolution {
    profiles: FlameProfiles,
}

impl FlameSolution {
    pub fn new(profiles: FlameProfiles) -> FlameResult<Self> {
        let n = profiles.grid.len();
        let columns: [(&str, &[f64]); 6] = [
            ("grid", profiles.grid.as_slice()),
            ("fuel_mole_fraction", profiles.fuel_mole_fraction.as_slice()),
            ("heat_release_rate", profiles.heat_release_rate.as_slice()),
            ("viscosity", profiles.viscosity.as_slice()),
            ("temperature", profiles.temperature.as_slice()),
            ("velocity", profiles.velocity.as_slice()),
        ];

        for (name, values) in columns {
            if values.len() != n {
                return Err(FlameError::InvalidProfile {
                    what: format!(
                        "{} has {} entries, grid has {}",
                        name,
                        values.len(),
                        n
                    ),
                });
            }
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(FlameError::InvalidProfile {
                    what: format!("{} has a non-finite value at index {}", name, i),
                });
            }
        }

        if !is_strictly_increasing(&profiles.grid) {
            return Err(FlameError::InvalidProfile {
                what: "grid positions must be strictly increasing".to_string(),
            });
        }

        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.grid.is_empty()
    }

    pub fn grid(&self) -> &[f64] {
        &self.profiles.grid
    }

    pub fn fuel_mole_fraction(&self) -> &[f64] {
        &self.profiles.fuel_mole_fraction
    }

    pub fn heat_release_rate(&self) -> &[f64] {
        &self.profiles.heat_release_rate
    }

    pub fn viscosity(&self) -> &[f64] {
        &self.profiles.viscosity
    }

    pub fn temperature(&self) -> &[f64] {
        &self.profiles.temperature
    }

    pub fn velocity(&self) -> &[f64] {
        &self.profiles.velocity
    }

    pub fn point(&self, index: usize) -> Option<ProfilePoint> {
        let p = &self.profiles;
        (index < self.len()).then(|| ProfilePoint {
            position: p.grid[index],
            fuel_mole_fraction: p.fuel_mole_fraction[index],
            heat_release_rate: p.heat_release_rate[index],
            viscosity: p.viscosity[index],
            temperature: p.temperature[index],
            velocity: p.velocity[index],
        })
    }

    /// Samples in grid order.
    pub fn points(&self) -> impl Iterator<Item = ProfilePoint> + '_ {
        (0..self.len()).filter_map(|i| self.point(i))
    }

    pub fn profiles(&self) -> &FlameProfiles {
        &self.profiles
    }

    pub fn into_profiles(self) -> FlameProfiles {
        self.profiles
    }
}

impl TryFrom<FlameProfiles> for FlameSolution {
    type Error = FlameError;

    fn try_from(profiles: FlameProfiles) -> FlameResult<Self> {
        Self::new(profiles)
    }
}
