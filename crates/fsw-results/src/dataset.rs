//! Append-only aggregation of per-run flame profiles.

use crate::types::{AggregatedRow, RunEntry};
use crate::{ResultsError, ResultsResult};
use fsw_flame::{DerivedMetrics, FlameSolution};

/// Ordered rows of every aggregated run.
///
/// Rows keep grid order within a run and insertion order across runs. The
/// dataset only grows: rows are never reordered or edited once appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedDataset {
    rows: Vec<AggregatedRow>,
    runs: Vec<RunEntry>,
}

/// Rows sharing one equivalence ratio, in dataset order.
#[derive(Debug, Clone)]
pub struct RowGroup<'a> {
    pub equivalence_ratio: f64,
    pub rows: Vec<&'a AggregatedRow>,
}

impl AggregatedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row per grid point of `solution`, each tagged with `phi`
    /// and `metrics`.
    pub fn append(
        &mut self,
        solution: &FlameSolution,
        phi: f64,
        metrics: DerivedMetrics,
    ) -> &RunEntry {
        let run_index = self.runs.len();
        let first_row = self.rows.len();
        self.rows.reserve(solution.len());
        self.rows.extend(solution.points().map(|p| AggregatedRow {
            run_index,
            equivalence_ratio: phi,
            position_m: p.position,
            fuel_mole_fraction: p.fuel_mole_fraction,
            heat_release_rate_w_m3: p.heat_release_rate,
            viscosity_pa_s: p.viscosity,
            temperature_k: p.temperature,
            velocity_m_s: p.velocity,
            laminar_burning_velocity_m_s: metrics.laminar_burning_velocity,
            flame_length_m: metrics.flame_length,
        }));
        self.runs.push(RunEntry {
            run_index,
            equivalence_ratio: phi,
            metrics,
            first_row,
            row_count: solution.len(),
        });
        &self.runs[run_index]
    }

    /// Rebuild a dataset from stored rows.
    ///
    /// Rows must be grouped by run, with run indices counting up from zero.
    pub fn from_rows(rows: Vec<AggregatedRow>) -> ResultsResult<Self> {
        let mut runs: Vec<RunEntry> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.run_index == row.run_index => {
                    if run.equivalence_ratio.to_bits() != row.equivalence_ratio.to_bits()
                        || run.metrics != row.metrics()
                    {
                        return Err(ResultsError::InvalidDataset {
                            what: format!("row {} disagrees with its run {}", i, row.run_index),
                        });
                    }
                    run.row_count += 1;
                }
                _ => {
                    if row.run_index != runs.len() {
                        return Err(ResultsError::InvalidDataset {
                            what: format!(
                                "row {} has run index {}, expected {}",
                                i,
                                row.run_index,
                                runs.len()
                            ),
                        });
                    }
                    runs.push(RunEntry {
                        run_index: row.run_index,
                        equivalence_ratio: row.equivalence_ratio,
                        metrics: row.metrics(),
                        first_row: i,
                        row_count: 1,
                    });
                }
            }
        }
        Ok(Self { rows, runs })
    }

    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    pub fn runs(&self) -> &[RunEntry] {
        &self.runs
    }

    pub fn run_rows(&self, run: &RunEntry) -> &[AggregatedRow] {
        &self.rows[run.row_range()]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Partition rows by equivalence ratio, groups in first-seen order.
    pub fn groups(&self) -> Vec<RowGroup<'_>> {
        let mut groups: Vec<RowGroup<'_>> = Vec::new();
        for row in &self.rows {
            let bits = row.equivalence_ratio.to_bits();
            match groups
                .iter_mut()
                .find(|g| g.equivalence_ratio.to_bits() == bits)
            {
                Some(group) => group.rows.push(row),
                None => groups.push(RowGroup {
                    equivalence_ratio: row.equivalence_ratio,
                    rows: vec![row],
                }),
            }
        }
        groups
    }
}
