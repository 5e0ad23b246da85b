//! SVG output through plotters.

use crate::model::Chart;
use crate::renderer::ChartSink;
use crate::{ChartError, ChartResult};
use plotters::prelude::*;
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Writes one `<slug>.svg` per chart into `out_dir`.
///
/// Charts whose titles share a slug get `_2`, `_3`, ... suffixes so no file is overwritten.
pub struct SvgChartSink {
    out_dir: PathBuf,
    width: u32,
    height: u32,
    line_width: u32,
    written: Vec<PathBuf>,
    stems: HashSet<String>,
}

impl SvgChartSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> ChartResult<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self {
            out_dir,
            width: 1024,
            height: 768,
            line_width: 2,
            written: Vec::new(),
            stems: HashSet::new(),
        })
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, in draw order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn unique_stem(&mut self, slug: String) -> String {
        let mut stem = slug.clone();
        let mut n = 2;
        while self.stems.contains(&stem) {
            stem = format!("{slug}_{n}");
            n += 1;
        }
        self.stems.insert(stem.clone());
        stem
    }

    fn color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    fn draw_on_area<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, plotters::coord::Shift>,
        chart: &Chart,
    ) -> Result<(), Box<dyn Error>>
    where
        <DB as DrawingBackend>::ErrorType: 'static,
    {
        let ((x_min, x_max), (y_min, y_max)) = chart.bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        let (x_min, x_max) = padded(x_min, x_max, 0.0);
        let (y_min, y_max) = padded(y_min, y_max, 0.05);

        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 32.0).into_font())
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .draw()?;

        let line_width = self.line_width;
        for (i, series) in chart.series.iter().enumerate() {
            let color = Self::color(i);
            ctx.draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(line_width),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(line_width))
            });
        }

        if !chart.series.is_empty() {
            ctx.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartSink for SvgChartSink {
    fn draw(&mut self, chart: &Chart) -> ChartResult<()> {
        let stem = self.unique_stem(chart.slug());
        let path = self.out_dir.join(format!("{stem}.svg"));
        {
            let root = SVGBackend::new(&path, (self.width, self.height)).into_drawing_area();
            self.draw_on_area(&root, chart)
                .map_err(|e| ChartError::Render {
                    title: chart.title.clone(),
                    path: path.clone(),
                    message: e.to_string(),
                })?;
        }
        info!(path = %path.display(), "wrote chart");
        self.written.push(path);
        Ok(())
    }
}

// Widen a degenerate or tight range so plotters gets a usable axis.
fn padded(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad, max + pad);
    }
    (min - fraction * span, max + fraction * span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_slugs_get_numbered_stems() {
        let dir = std::env::temp_dir().join(format!("fsw-chart-stems-{}", std::process::id()));
        let mut sink = SvgChartSink::new(&dir).unwrap();
        assert_eq!(sink.unique_stem("temperature".into()), "temperature");
        assert_eq!(sink.unique_stem("temperature".into()), "temperature_2");
        assert_eq!(sink.unique_stem("temperature_2".into()), "temperature_2_2");
        assert_eq!(sink.unique_stem("temperature".into()), "temperature_3");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn padding_handles_flat_ranges() {
        assert_eq!(padded(0.0, 0.0, 0.05), (-1.0, 1.0));
        let (lo, hi) = padded(2.0, 2.0, 0.05);
        assert!(lo < 2.0 && hi > 2.0);
        assert_eq!(padded(0.0, 10.0, 0.0), (0.0, 10.0));
    }
}
