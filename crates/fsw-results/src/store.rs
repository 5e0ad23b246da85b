//! Sweep storage API.

use crate::dataset::AggregatedDataset;
use crate::types::{AggregatedRow, SweepManifest};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-per-sweep store: `<root>/<sweep_id>/{manifest.json, rows.jsonl}`.
#[derive(Clone)]
pub struct SweepStore {
    root_dir: PathBuf,
}

impl SweepStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a sweep config file, under `.flamesweep/sweeps`.
    pub fn for_config(config_path: &Path) -> ResultsResult<Self> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "config path has no parent directory".to_string(),
            })?;
        let config_dir = if config_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            config_dir
        };
        Self::new(config_dir.join(".flamesweep").join("sweeps"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn sweep_dir(&self, sweep_id: &str) -> PathBuf {
        self.root_dir.join(sweep_id)
    }

    pub fn has_sweep(&self, sweep_id: &str) -> bool {
        self.sweep_dir(sweep_id).join("manifest.json").exists()
    }

    pub fn save_sweep(
        &self,
        manifest: &SweepManifest,
        dataset: &AggregatedDataset,
    ) -> ResultsResult<()> {
        if manifest.row_count != dataset.len() {
            return Err(ResultsError::InvalidDataset {
                what: format!(
                    "manifest lists {} rows but dataset has {}",
                    manifest.row_count,
                    dataset.len()
                ),
            });
        }

        let sweep_dir = self.sweep_dir(&manifest.sweep_id);
        fs::create_dir_all(&sweep_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(sweep_dir.join("manifest.json"), manifest_json)?;

        let mut rows_content = String::new();
        for row in dataset.rows() {
            rows_content.push_str(&serde_json::to_string(row)?);
            rows_content.push('\n');
        }
        fs::write(sweep_dir.join("rows.jsonl"), rows_content)?;

        Ok(())
    }

    pub fn load_manifest(&self, sweep_id: &str) -> ResultsResult<SweepManifest> {
        let manifest_path = self.sweep_dir(sweep_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::SweepNotFound {
                sweep_id: sweep_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_dataset(&self, sweep_id: &str) -> ResultsResult<AggregatedDataset> {
        let rows_path = self.sweep_dir(sweep_id).join("rows.jsonl");

        if !rows_path.exists() {
            return Err(ResultsError::SweepNotFound {
                sweep_id: sweep_id.to_string(),
            });
        }

        let content = fs::read_to_string(rows_path)?;
        let mut rows = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let row: AggregatedRow = serde_json::from_str(line)?;
                rows.push(row);
            }
        }

        AggregatedDataset::from_rows(rows)
    }

    /// All readable manifests, newest first.
    pub fn list_sweeps(&self) -> ResultsResult<Vec<SweepManifest>> {
        let mut sweeps = Vec::new();

        if !self.root_dir.exists() {
            return Ok(sweeps);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let sweep_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&sweep_id) {
                    sweeps.push(manifest);
                }
            }
        }

        sweeps.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(sweeps)
    }

    pub fn delete_sweep(&self, sweep_id: &str) -> ResultsResult<()> {
        let sweep_dir = self.sweep_dir(sweep_id);
        if sweep_dir.exists() {
            fs::remove_dir_all(sweep_dir)?;
        }
        Ok(())
    }
}
