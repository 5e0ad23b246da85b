//! Sweep config validation.

use crate::config::{FlameModeDef, LATEST_VERSION, SolverDef, SweepConfig};
use crate::controller::Execution;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Sweep has no equivalence ratios")]
    EmptySweep,

    #[error("Duplicate equivalence ratio: {value}")]
    DuplicateValue { value: f64 },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Conflicting settings: {what}")]
    Conflict { what: String },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Longest accepted solver timeout, one week.
pub const MAX_TIMEOUT_S: f64 = 7.0 * 24.0 * 3600.0;

fn positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

pub fn validate_config(config: &SweepConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }
    if config.mechanism.trim().is_empty() {
        return Err(invalid("mechanism", "", "must not be empty"));
    }

    let mixture = &config.mixture;
    if mixture.fuel.trim().is_empty() {
        return Err(invalid("mixture.fuel", "", "must not be empty"));
    }
    if mixture.oxidizer.trim().is_empty() {
        return Err(invalid("mixture.oxidizer", "", "must not be empty"));
    }
    positive_finite("mixture.temperature_k", mixture.temperature_k)?;
    positive_finite("mixture.pressure_pa", mixture.pressure_pa)?;

    validate_sweep(config)?;
    validate_flame(config)?;
    validate_solver(&config.solver)?;

    if let Execution::Parallel { workers } = config.run.execution
        && workers == 0
    {
        return Err(invalid("run.execution.workers", workers, "must be at least 1"));
    }

    Ok(())
}

fn validate_sweep(config: &SweepConfig) -> Result<(), ValidationError> {
    let sweep = &config.sweep;
    if !sweep.values.is_empty() && sweep.range.is_some() {
        return Err(ValidationError::Conflict {
            what: "sweep has both 'values' and 'range'".to_string(),
        });
    }

    if let Some(range) = &sweep.range {
        positive_finite("sweep.range.start", range.start)?;
        positive_finite("sweep.range.end", range.end)?;
        if range.num_points < 2 {
            return Err(invalid(
                "sweep.range.num_points",
                range.num_points,
                "must be at least 2",
            ));
        }
        if (range.start - range.end).abs() < 1e-12 {
            return Err(invalid(
                "sweep.range.end",
                range.end,
                "start and end values must be different",
            ));
        }
    }

    let values = sweep.equivalence_ratios();
    if values.is_empty() {
        return Err(ValidationError::EmptySweep);
    }
    let mut seen = HashSet::new();
    for &phi in &values {
        positive_finite("sweep.values", phi)?;
        if !seen.insert(phi.to_bits()) {
            return Err(ValidationError::DuplicateValue { value: phi });
        }
    }
    Ok(())
}

fn validate_flame(config: &SweepConfig) -> Result<(), ValidationError> {
    let flame = &config.flame;
    if let FlameModeDef::BurnerStabilized {
        mass_flux_kg_m2_s,
        inlet_velocity_m_s,
    } = &flame.mode
    {
        match (mass_flux_kg_m2_s, inlet_velocity_m_s) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::Conflict {
                    what: "burner needs either mass_flux_kg_m2_s or inlet_velocity_m_s, not both"
                        .to_string(),
                });
            }
            (Some(flux), None) => positive_finite("flame.mode.mass_flux_kg_m2_s", *flux)?,
            (None, Some(velocity)) => {
                positive_finite("flame.mode.inlet_velocity_m_s", *velocity)?
            }
            (None, None) => {
                return Err(invalid(
                    "flame.mode",
                    "burner_stabilized",
                    "needs mass_flux_kg_m2_s or inlet_velocity_m_s",
                ));
            }
        }
    }

    flame
        .refine
        .validate()
        .map_err(|e| invalid("flame.refine", format!("{:?}", flame.refine), &e.to_string()))?;

    if let Some(factor) = flame.time_step_factor {
        positive_finite("flame.time_step_factor", factor)?;
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    match solver {
        SolverDef::Process {
            command, timeout_s, ..
        } => {
            if command.trim().is_empty() {
                return Err(invalid("solver.command", "", "must not be empty"));
            }
            if let Some(timeout) = timeout_s {
                positive_finite("solver.timeout_s", *timeout)?;
                if *timeout > MAX_TIMEOUT_S {
                    return Err(invalid(
                        "solver.timeout_s",
                        timeout,
                        &format!("must not exceed {MAX_TIMEOUT_S} s"),
                    ));
                }
            }
        }
        SolverDef::Replay { dir } => {
            if dir.as_os_str().is_empty() {
                return Err(invalid("solver.dir", "", "must not be empty"));
            }
        }
    }
    Ok(())
}
