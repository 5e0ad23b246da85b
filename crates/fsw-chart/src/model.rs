//! Chart model handed to a [`ChartSink`](crate::ChartSink).

use crate::field::ChartField;
use serde::{Deserialize, Serialize};

/// One requested overlay chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub x: ChartField,
    pub y: ChartField,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl ChartRequest {
    pub fn new(x: ChartField, y: ChartField, title: impl Into<String>) -> Self {
        Self {
            x,
            y,
            title: title.into(),
            x_label: None,
            y_label: None,
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn x_label(&self) -> &str {
        self.x_label.as_deref().unwrap_or(self.x.axis_label())
    }

    pub fn y_label(&self) -> &str {
        self.y_label.as_deref().unwrap_or(self.y.axis_label())
    }
}

/// Profile charts drawn when the sweep config names none.
pub fn default_requests() -> Vec<ChartRequest> {
    vec![
        ChartRequest::new(
            ChartField::Position,
            ChartField::FuelMoleFraction,
            "Fuel mole fraction",
        ),
        ChartRequest::new(
            ChartField::Position,
            ChartField::HeatReleaseRate,
            "Heat release rate",
        ),
        ChartRequest::new(ChartField::Position, ChartField::Viscosity, "Viscosity"),
        ChartRequest::new(ChartField::Position, ChartField::Temperature, "Temperature"),
    ]
}

/// The velocity-profile chart, always rendered after the requested ones.
pub fn velocity_request() -> ChartRequest {
    ChartRequest::new(ChartField::Position, ChartField::Velocity, "Velocity profile")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        for c in self.title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        }
        while slug.ends_with('_') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("chart");
        }
        slug
    }

    /// Bounds over every point, `None` for a chart with no points.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let &(x0, y0) = points.next()?;
        let mut bounds = ((x0, x0), (y0, y0));
        for &(x, y) in points {
            bounds.0.0 = bounds.0.0.min(x);
            bounds.0.1 = bounds.0.1.max(x);
            bounds.1.0 = bounds.1.0.min(y);
            bounds.1.1 = bounds.1.1.max(y);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(title: &str) -> Chart {
        Chart {
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        }
    }

    #[test]
    fn slug_is_lowercase_and_underscored() {
        assert_eq!(chart("Heat release rate").slug(), "heat_release_rate");
        assert_eq!(chart("  T (K) vs x ").slug(), "t_k_vs_x");
        assert_eq!(chart("φ").slug(), "chart");
    }

    #[test]
    fn bounds_cover_all_series() {
        let mut c = chart("x");
        assert_eq!(c.bounds(), None);
        c.series.push(Series {
            label: "a".into(),
            points: vec![(0.0, 5.0), (1.0, 2.0)],
        });
        c.series.push(Series {
            label: "b".into(),
            points: vec![(-1.0, 7.0)],
        });
        assert_eq!(c.bounds(), Some(((-1.0, 1.0), (2.0, 7.0))));
    }

    #[test]
    fn labels_fall_back_to_field_names() {
        let req = default_requests().remove(3);
        assert_eq!(req.y_label(), "Temperature (K)");
        let req = req.with_labels("x", "T");
        assert_eq!(req.y_label(), "T");
    }
}
