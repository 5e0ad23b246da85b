//! Replay of previously recorded flame solutions.

use crate::config::{FlameConfig, ModeKind};
use crate::error::{FlameError, FlameResult};
use crate::solution::{FlameProfiles, FlameSolution};
use crate::solver::FlameSolver;
use fsw_core::numeric::{Tolerances, nearly_equal};
use fsw_mixture::MixtureState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One stored run: the φ and mode it was solved for plus its profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub equivalence_ratio: f64,
    pub mode: ModeKind,
    pub profiles: FlameProfiles,
}

impl Recording {
    pub fn new(equivalence_ratio: f64, mode: ModeKind, solution: &FlameSolution) -> Self {
        Self {
            equivalence_ratio,
            mode,
            profiles: solution.profiles().clone(),
        }
    }

    /// File name used by [`Recording::save_in`].
    pub fn file_name(&self) -> String {
        let mode = match self.mode {
            ModeKind::BurnerStabilized => "burner",
            ModeKind::FreelyPropagating => "free",
        };
        format!("{}_phi_{}.json", mode, self.equivalence_ratio)
    }

    pub fn save_in(&self, dir: &Path) -> FlameResult<()> {
        fs::create_dir_all(dir).map_err(backend)?;
        let json = serde_json::to_string_pretty(self).map_err(backend)?;
        fs::write(dir.join(self.file_name()), json).map_err(backend)?;
        Ok(())
    }
}

fn backend(e: impl std::fmt::Display) -> FlameError {
    FlameError::Backend {
        message: e.to_string(),
    }
}

/// Serves recorded solutions instead of solving.
#[derive(Debug, Clone, Default)]
pub struct ReplaySolver {
    recordings: Vec<Recording>,
}

impl ReplaySolver {
    pub fn new(recordings: Vec<Recording>) -> Self {
        Self { recordings }
    }

    /// Load every `*.json` recording in `dir`.
    pub fn load_dir(dir: &Path) -> FlameResult<Self> {
        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|e| FlameError::Backend {
                message: format!("cannot read recordings in {}: {}", dir.display(), e),
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort();

        let mut recordings = Vec::with_capacity(entries.len());
        for path in entries {
            let content = fs::read_to_string(&path).map_err(backend)?;
            let recording: Recording =
                serde_json::from_str(&content).map_err(|e| FlameError::Backend {
                    message: format!("invalid recording {}: {}", path.display(), e),
                })?;
            recordings.push(recording);
        }
        Ok(Self { recordings })
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    fn find(&self, phi: f64, mode: ModeKind) -> Option<&Recording> {
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        self.recordings
            .iter()
            .find(|r| r.mode == mode && nearly_equal(r.equivalence_ratio, phi, tol))
    }
}

impl FlameSolver for ReplaySolver {
    fn name(&self) -> &str {
        "replay"
    }

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        let phi = mixture.equivalence_ratio();
        let mode = config.mode.kind();
        let recording = self
            .find(phi, mode)
            .ok_or_else(|| FlameError::SolverDivergence {
                message: format!("no {} recording for φ = {}", mode, phi),
            })?;
        FlameSolution::new(recording.profiles.clone())
    }
}
