//! Equivalence-ratio sweep definitions.
//!
//! A sweep is either an explicit list of values or a generated range. Generated
//! ranges always end exactly on the requested end value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepSpacing {
    /// Uniformly spaced points
    #[default]
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Generated range of sweep values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
    #[serde(default)]
    pub spacing: SweepSpacing,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, num_points: usize, spacing: SweepSpacing) -> Self {
        Self {
            start,
            end,
            num_points,
            spacing,
        }
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.spacing {
            SweepSpacing::Linear => self.generate_linear(),
            SweepSpacing::Logarithmic => self.generate_logarithmic(),
        }
    }

    fn generate_linear(&self) -> Vec<f64> {
        if self.num_points <= 1 {
            return vec![self.start];
        }

        let delta = (self.end - self.start) / (self.num_points - 1) as f64;
        let mut points: Vec<f64> = (0..self.num_points)
            .map(|i| self.start + i as f64 * delta)
            .collect();

        // Ensure exact endpoint
        points[self.num_points - 1] = self.end;
        points
    }

    fn generate_logarithmic(&self) -> Vec<f64> {
        if self.num_points <= 1 {
            return vec![self.start];
        }

        if self.start <= 0.0 || self.end <= 0.0 {
            return self.generate_linear();
        }

        let log_start = self.start.ln();
        let log_delta = (self.end.ln() - log_start) / (self.num_points - 1) as f64;
        let mut points: Vec<f64> = (0..self.num_points)
            .map(|i| (log_start + i as f64 * log_delta).exp())
            .collect();

        points[0] = self.start;
        points[self.num_points - 1] = self.end;
        points
    }
}

/// Sweep section of a config: `values` or `range`, never both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepDef {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SweepRange>,
}

impl SweepDef {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            range: None,
        }
    }

    pub fn from_range(range: SweepRange) -> Self {
        Self {
            values: Vec::new(),
            range: Some(range),
        }
    }

    /// Equivalence ratios in sweep order.
    pub fn equivalence_ratios(&self) -> Vec<f64> {
        if !self.values.is_empty() {
            return self.values.clone();
        }
        self.range
            .as_ref()
            .map(SweepRange::generate_points)
            .unwrap_or_default()
    }
}

impl fmt::Display for SweepSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Logarithmic => write!(f, "logarithmic"),
        }
    }
}

impl fmt::Display for SweepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phi from {} to {} ({} points, {})",
            self.start, self.end, self.num_points, self.spacing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn linear_sweep_generation() {
        let points = SweepRange::new(0.5, 1.5, 5, SweepSpacing::Linear).generate_points();
        assert_eq!(points.len(), 5);
        assert!((points[0] - 0.5).abs() < 1e-12);
        assert!((points[2] - 1.0).abs() < 1e-12);
        assert_eq!(points[4], 1.5);
    }

    #[test]
    fn logarithmic_sweep_generation() {
        let points = SweepRange::new(0.1, 10.0, 3, SweepSpacing::Logarithmic).generate_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], 0.1);
        assert!((points[1] - 1.0).abs() < 1e-12);
        assert_eq!(points[2], 10.0);
    }

    #[test]
    fn single_point_sweep() {
        let points = SweepRange::new(1.0, 1.0, 1, SweepSpacing::Linear).generate_points();
        assert_eq!(points, vec![1.0]);
    }

    #[test]
    fn explicit_values_win_over_range() {
        let def = SweepDef {
            values: vec![0.4, 0.8],
            range: Some(SweepRange::new(1.0, 2.0, 3, SweepSpacing::Linear)),
        };
        assert_eq!(def.equivalence_ratios(), vec![0.4, 0.8]);
        assert!(SweepDef::default().equivalence_ratios().is_empty());
    }

    #[test]
    fn yaml_spacing_defaults_to_linear() {
        let def: SweepDef = serde_yaml::from_str("range: {start: 0.5, end: 2.0, num_points: 4}")
            .expect("parse");
        let range = def.range.unwrap();
        assert_eq!(range.spacing, SweepSpacing::Linear);
        assert_eq!(range.generate_points().len(), 4);
    }

    proptest! {
        #[test]
        fn generated_points_are_monotonic_and_end_exactly(
            start in 0.1f64..2.0,
            span in 0.1f64..3.0,
            n in 2usize..40,
            log in any::<bool>(),
        ) {
            let spacing = if log { SweepSpacing::Logarithmic } else { SweepSpacing::Linear };
            let end = start + span;
            let points = SweepRange::new(start, end, n, spacing).generate_points();
            prop_assert_eq!(points.len(), n);
            prop_assert_eq!(points[n - 1], end);
            prop_assert!(points.windows(2).all(|w| w[1] > w[0]));
        }
    }
}
