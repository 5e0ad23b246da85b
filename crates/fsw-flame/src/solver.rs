//! Solver seam and adapter.

use crate::config::FlameConfig;
use crate::error::{FlameError, FlameResult};
use crate::solution::FlameSolution;
use fsw_mixture::{Mechanism, MixtureState};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// External reacting-flow solver.
///
/// Implementations block until the solver reports convergence or failure.
/// They must not retry on their own behalf: a divergent run is reported as
/// [`FlameError::SolverDivergence`] and the caller decides what to do.
pub trait FlameSolver: Send + Sync {
    /// Short identifier used in logs and sweep hashes.
    fn name(&self) -> &str;

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution>;
}

impl<S: FlameSolver + ?Sized> FlameSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        (**self).solve(mixture, config)
    }
}

impl<S: FlameSolver + ?Sized> FlameSolver for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        (**self).solve(mixture, config)
    }
}

/// Checks a run's inputs against the mechanism, then calls the solver exactly once.
#[derive(Clone)]
pub struct FlameSolverAdapter {
    solver: Arc<dyn FlameSolver>,
    mechanism: Arc<Mechanism>,
}

impl FlameSolverAdapter {
    pub fn new(solver: Arc<dyn FlameSolver>, mechanism: Arc<Mechanism>) -> Self {
        Self { solver, mechanism }
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }

    pub fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        config.validate()?;
        self.check_mechanism(mixture)?;

        debug!(
            solver = self.solver.name(),
            phi = mixture.equivalence_ratio(),
            mode = %config.mode,
            "invoking flame solver"
        );
        let started = Instant::now();
        let solution = self.solver.solve(mixture, config)?;
        debug!(
            solver = self.solver.name(),
            phi = mixture.equivalence_ratio(),
            grid_points = solution.len(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "flame solver converged"
        );
        Ok(solution)
    }

    fn check_mechanism(&self, mixture: &MixtureState) -> FlameResult<()> {
        if !mixture.mechanism().eq_ignore_ascii_case(self.mechanism.name()) {
            return Err(FlameError::Mechanism {
                message: format!(
                    "mixture was built against '{}' but the solver uses '{}'",
                    mixture.mechanism(),
                    self.mechanism.name()
                ),
            });
        }
        if let Some((missing, _)) = mixture
            .composition()
            .iter()
            .find(|(name, _)| !self.mechanism.contains(name))
        {
            return Err(FlameError::Mechanism {
                message: format!(
                    "species '{}' not found in mechanism '{}'",
                    missing,
                    self.mechanism.name()
                ),
            });
        }
        Ok(())
    }
}
