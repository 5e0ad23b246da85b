//! Builds overlay charts from an aggregated dataset.

use crate::ChartResult;
use crate::model::{Chart, ChartRequest, Series, velocity_request};
use fsw_results::AggregatedDataset;
use tracing::debug;

/// Receives each built chart, in order.
pub trait ChartSink {
    fn draw(&mut self, chart: &Chart) -> ChartResult<()>;
}

impl<S: ChartSink + ?Sized> ChartSink for &mut S {
    fn draw(&mut self, chart: &Chart) -> ChartResult<()> {
        (**self).draw(chart)
    }
}

impl ChartSink for Vec<Chart> {
    fn draw(&mut self, chart: &Chart) -> ChartResult<()> {
        self.push(chart.clone());
        Ok(())
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// One chart per request, then the velocity-profile chart.
    pub fn build_charts(dataset: &AggregatedDataset, requests: &[ChartRequest]) -> Vec<Chart> {
        let velocity = velocity_request();
        requests
            .iter()
            .chain(std::iter::once(&velocity))
            .map(|req| Self::build_chart(dataset, req))
            .collect()
    }

    pub fn build_chart(dataset: &AggregatedDataset, request: &ChartRequest) -> Chart {
        let series = if request.x.is_per_run() && request.y.is_per_run() {
            Self::run_series(dataset, request)
        } else {
            Self::profile_series(dataset, request)
        };
        Chart {
            title: request.title.clone(),
            x_label: request.x_label().to_string(),
            y_label: request.y_label().to_string(),
            series,
        }
    }

    /// Build and hand every chart to `sink`; returns how many were drawn.
    pub fn render<S: ChartSink + ?Sized>(
        dataset: &AggregatedDataset,
        requests: &[ChartRequest],
        sink: &mut S,
    ) -> ChartResult<usize> {
        let charts = Self::build_charts(dataset, requests);
        for chart in &charts {
            debug!(title = %chart.title, series = chart.series.len(), "drawing chart");
            sink.draw(chart)?;
        }
        Ok(charts.len())
    }

    // One curve per equivalence ratio, points in grid order.
    fn profile_series(dataset: &AggregatedDataset, request: &ChartRequest) -> Vec<Series> {
        dataset
            .groups()
            .into_iter()
            .map(|group| Series {
                label: series_label(group.equivalence_ratio),
                points: group
                    .rows
                    .iter()
                    .filter_map(|row| Some((request.x.value(row)?, request.y.value(row)?)))
                    .collect(),
            })
            .collect()
    }

    // A single curve with one point per run.
    fn run_series(dataset: &AggregatedDataset, request: &ChartRequest) -> Vec<Series> {
        let points = dataset
            .runs()
            .iter()
            .filter_map(|run| {
                let row = dataset.run_rows(run).first()?;
                Some((request.x.value(row)?, request.y.value(row)?))
            })
            .collect();
        vec![Series {
            label: request.title.clone(),
            points,
        }]
    }
}

pub fn series_label(phi: f64) -> String {
    format!("φ = {:?}", phi)
}
