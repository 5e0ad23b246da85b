//! fsw-chart: overlay charts of an aggregated sweep, one curve per equivalence ratio.

pub mod error;
pub mod field;
pub mod model;
pub mod renderer;
pub mod svg;

pub use error::{ChartError, ChartResult};
pub use field::ChartField;
pub use model::{Chart, ChartRequest, Series, default_requests, velocity_request};
pub use renderer::{ChartRenderer, ChartSink};
pub use svg::SvgChartSink;
