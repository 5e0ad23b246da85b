//! Flat-table export of an aggregated dataset.

use crate::ResultsResult;
use crate::dataset::AggregatedDataset;
use std::path::Path;

pub const CSV_COLUMNS: [&str; 9] = [
    "position_m",
    "fuel_mole_fraction",
    "heat_release_rate_w_m3",
    "viscosity_pa_s",
    "temperature_k",
    "velocity_m_s",
    "equivalence_ratio",
    "laminar_burning_velocity_m_s",
    "flame_length_m",
];

/// Render the dataset as CSV, one line per row. Missing flame lengths stay empty.
pub fn to_csv(dataset: &AggregatedDataset) -> String {
    let mut csv = CSV_COLUMNS.join(",");
    csv.push('\n');
    for row in dataset.rows() {
        let flame_length = row
            .flame_length_m
            .map(|v| v.to_string())
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            row.position_m,
            row.fuel_mole_fraction,
            row.heat_release_rate_w_m3,
            row.viscosity_pa_s,
            row.temperature_k,
            row.velocity_m_s,
            row.equivalence_ratio,
            row.laminar_burning_velocity_m_s,
            flame_length
        ));
    }
    csv
}

pub fn write_csv(dataset: &AggregatedDataset, path: &Path) -> ResultsResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_csv(dataset))?;
    Ok(())
}
