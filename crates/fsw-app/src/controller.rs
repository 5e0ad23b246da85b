//! Sweep execution: one mixture, solve and metric pass per equivalence ratio.

use crate::config::FlameDef;
use crate::error::{AppError, AppResult, RunError};
use crate::progress::SweepProgressEvent;
use fsw_flame::{
    DerivedMetrics, FlameSolution, FlameSolverAdapter, ModeKind, Recording, compute_metrics,
};
use fsw_mixture::MixtureInitializer;
use fsw_results::{AggregatedDataset, SkippedRun};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{info, warn};

/// What to do when a single run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing run and report it.
    #[default]
    FailFast,
    /// Record the failure and move on to the next value.
    SkipAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Execution {
    #[default]
    Sequential,
    /// Runs dispatched onto a dedicated thread pool of `workers` threads.
    Parallel { workers: usize },
}

/// Summary of a finished sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub total: usize,
    pub completed: usize,
    pub skipped: Vec<SkippedRun>,
    pub row_count: usize,
    pub elapsed_wall_s: f64,
}

type RunOutcome = Result<(FlameSolution, DerivedMetrics), RunError>;

/// The per-run pipeline. Shared read-only by workers.
struct RunPipeline {
    initializer: MixtureInitializer,
    adapter: FlameSolverAdapter,
    flame: FlameDef,
    record_dir: Option<PathBuf>,
}

impl RunPipeline {
    fn run(&self, phi: f64) -> RunOutcome {
        let mixture = self.initializer.initialize(phi)?;
        let config = self.flame.config_for(mixture.density().value);
        let solution = self.adapter.solve(&mixture, &config)?;
        let metrics = compute_metrics(&solution, &config.mode)?;
        self.record(phi, &solution);
        Ok((solution, metrics))
    }

    fn record(&self, phi: f64, solution: &FlameSolution) {
        let Some(dir) = &self.record_dir else {
            return;
        };
        let recording = Recording::new(phi, self.flame.kind(), solution);
        if let Err(err) = recording.save_in(dir) {
            warn!(phi, error = %err, "failed to record solution");
        }
    }
}

/// Drives a sweep and owns the aggregated dataset.
///
/// The dataset survives a fail-fast abort, so rows of the runs that completed
/// before the failing value stay available through [`SweepController::dataset`]
/// and travel with the returned [`AppError::SweepAborted`].
pub struct SweepController {
    pipeline: RunPipeline,
    equivalence_ratios: Vec<f64>,
    policy: FailurePolicy,
    execution: Execution,
    dataset: AggregatedDataset,
}

impl SweepController {
    pub fn new(
        initializer: MixtureInitializer,
        adapter: FlameSolverAdapter,
        flame: FlameDef,
        equivalence_ratios: Vec<f64>,
    ) -> Self {
        Self {
            pipeline: RunPipeline {
                initializer,
                adapter,
                flame,
                record_dir: None,
            },
            equivalence_ratios,
            policy: FailurePolicy::default(),
            execution: Execution::default(),
            dataset: AggregatedDataset::new(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Save each converged solution as a replay recording in `dir`.
    pub fn with_record_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipeline.record_dir = Some(dir.into());
        self
    }

    pub fn equivalence_ratios(&self) -> &[f64] {
        &self.equivalence_ratios
    }

    pub fn mode(&self) -> ModeKind {
        self.pipeline.flame.kind()
    }

    pub fn solver_name(&self) -> &str {
        self.pipeline.adapter.solver_name()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn dataset(&self) -> &AggregatedDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> AggregatedDataset {
        self.dataset
    }

    /// Execute every run in sweep order. Clears rows of any previous call.
    pub fn run(
        &mut self,
        progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
    ) -> AppResult<SweepReport> {
        if self.equivalence_ratios.is_empty() {
            return Err(AppError::InvalidInput(
                "sweep has no equivalence ratios".to_string(),
            ));
        }

        self.dataset = AggregatedDataset::new();
        let total = self.equivalence_ratios.len();
        info!(
            runs = total,
            mode = %self.pipeline.flame.kind(),
            solver = self.pipeline.adapter.solver_name(),
            "starting sweep"
        );

        let mut collector = Collector {
            dataset: &mut self.dataset,
            policy: self.policy,
            total,
            started: Instant::now(),
            completed: 0,
            skipped: Vec::new(),
            progress_cb,
        };

        let outcome = match self.execution {
            Execution::Sequential => {
                run_sequential(&self.pipeline, &self.equivalence_ratios, &mut collector)
            }
            Execution::Parallel { workers } => run_parallel(
                &self.pipeline,
                &self.equivalence_ratios,
                workers,
                &mut collector,
            ),
        };
        if let Err(mut err) = outcome {
            if let AppError::SweepAborted { partial, .. } = &mut err {
                **partial = collector.dataset.clone();
            }
            return Err(err);
        }

        let report = SweepReport {
            total,
            completed: collector.completed,
            skipped: collector.skipped,
            row_count: collector.dataset.len(),
            elapsed_wall_s: collector.started.elapsed().as_secs_f64(),
        };
        if report.completed == 0 {
            warn!(runs = total, "no run of the sweep completed");
        }
        info!(
            completed = report.completed,
            skipped = report.skipped.len(),
            rows = report.row_count,
            elapsed_s = report.elapsed_wall_s,
            "sweep finished"
        );
        Ok(report)
    }
}

/// Single owner of results and progress for one `run` call.
struct Collector<'a, 'cb> {
    dataset: &'a mut AggregatedDataset,
    policy: FailurePolicy,
    total: usize,
    started: Instant,
    completed: usize,
    skipped: Vec<SkippedRun>,
    progress_cb: Option<&'cb mut dyn FnMut(SweepProgressEvent)>,
}

impl Collector<'_, '_> {
    fn emit(&mut self, event: SweepProgressEvent) {
        if let Some(cb) = self.progress_cb.as_deref_mut() {
            cb(event);
        }
    }

    fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn run_started(&mut self, position: usize, phi: f64) {
        let event = SweepProgressEvent::RunStarted {
            index: position + 1,
            total: self.total,
            phi,
            elapsed_wall_s: self.elapsed(),
        };
        self.emit(event);
    }

    /// Insert a finished run. Fails only when fail-fast aborts the sweep.
    fn run_finished(&mut self, position: usize, phi: f64, outcome: RunOutcome) -> AppResult<()> {
        let index = position + 1;
        match outcome {
            Ok((solution, metrics)) => {
                self.dataset.append(&solution, phi, metrics);
                self.completed += 1;
                info!(
                    index,
                    total = self.total,
                    phi,
                    points = solution.len(),
                    laminar_burning_velocity = metrics.laminar_burning_velocity,
                    "run completed"
                );
                let event = SweepProgressEvent::RunCompleted {
                    index,
                    total: self.total,
                    phi,
                    laminar_burning_velocity: metrics.laminar_burning_velocity,
                    elapsed_wall_s: self.elapsed(),
                };
                self.emit(event);
                Ok(())
            }
            Err(err) => match self.policy {
                FailurePolicy::FailFast => Err(abort_error(position, phi, err)),
                FailurePolicy::SkipAndContinue => {
                    warn!(index, phi, kind = %err.kind(), error = %err, "run failed, skipping");
                    self.skipped.push(SkippedRun {
                        index,
                        equivalence_ratio: phi,
                        error: err.to_string(),
                    });
                    let event = SweepProgressEvent::RunSkipped {
                        index,
                        total: self.total,
                        phi,
                        error: err.to_string(),
                        elapsed_wall_s: self.elapsed(),
                    };
                    self.emit(event);
                    Ok(())
                }
            },
        }
    }
}

fn abort_error(position: usize, phi: f64, err: RunError) -> AppError {
    warn!(index = position + 1, phi, kind = %err.kind(), error = %err, "aborting sweep");
    AppError::SweepAborted {
        index: position + 1,
        phi,
        kind: err.kind(),
        source: err,
        partial: Box::default(),
    }
}

fn run_sequential(
    pipeline: &RunPipeline,
    phis: &[f64],
    collector: &mut Collector<'_, '_>,
) -> AppResult<()> {
    for (position, &phi) in phis.iter().enumerate() {
        collector.run_started(position, phi);
        let outcome = pipeline.run(phi);
        collector.run_finished(position, phi, outcome)?;
    }
    Ok(())
}

enum WorkerMessage {
    Started { position: usize },
    Finished { position: usize, outcome: RunOutcome },
    Cancelled { position: usize },
}

enum Slot {
    Done(RunOutcome),
    Cancelled,
}

/// Runs execute on a rayon pool; results come back over a channel and are
/// inserted here in sweep order, never in completion order.
///
/// Under fail-fast the lowest failing position is shared with the workers.
/// Runs past it are cancelled and their start events are dropped.
fn run_parallel(
    pipeline: &RunPipeline,
    phis: &[f64],
    workers: usize,
    collector: &mut Collector<'_, '_>,
) -> AppResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("fsw-sweep-{i}"))
        .build()
        .map_err(|e| AppError::Execution {
            message: e.to_string(),
        })?;

    let fail_fast = collector.policy == FailurePolicy::FailFast;
    let failed_at = AtomicUsize::new(usize::MAX);
    let failed_at = &failed_at;
    let (tx, rx) = mpsc::channel::<WorkerMessage>();

    let mut slots: Vec<Option<Slot>> = (0..phis.len()).map(|_| None).collect();
    let mut next = 0;
    let mut halted = false;
    let mut failure: Option<AppError> = None;

    pool.in_place_scope(|scope| {
        for (position, &phi) in phis.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                if position > failed_at.load(Ordering::SeqCst) {
                    let _ = tx.send(WorkerMessage::Cancelled { position });
                    return;
                }
                let _ = tx.send(WorkerMessage::Started { position });
                let outcome = pipeline.run(phi);
                if fail_fast && outcome.is_err() {
                    failed_at.fetch_min(position, Ordering::SeqCst);
                }
                let _ = tx.send(WorkerMessage::Finished { position, outcome });
            });
        }
        drop(tx);

        for message in rx {
            match message {
                WorkerMessage::Started { position } => {
                    if !halted && position < failed_at.load(Ordering::SeqCst) {
                        collector.run_started(position, phis[position]);
                    }
                }
                WorkerMessage::Finished { position, outcome } => {
                    slots[position] = Some(Slot::Done(outcome));
                }
                WorkerMessage::Cancelled { position } => {
                    slots[position] = Some(Slot::Cancelled);
                }
            }

            while !halted && next < slots.len() {
                let Some(slot) = slots[next].take() else {
                    break;
                };
                match slot {
                    Slot::Cancelled => halted = true,
                    Slot::Done(outcome) => {
                        if let Err(err) = collector.run_finished(next, phis[next], outcome) {
                            failure = Some(err);
                            halted = true;
                        } else {
                            next += 1;
                        }
                    }
                }
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None if halted => Err(AppError::Execution {
            message: format!("sweep halted at run {} without a recorded failure", next + 1),
        }),
        None => Ok(()),
    }
}
