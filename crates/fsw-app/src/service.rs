//! Sweep execution, caching and output service.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fsw_chart::{ChartRenderer, ChartRequest, SvgChartSink};
use fsw_flame::{FlameSolver, FlameSolverAdapter, ProcessSolver, ReplaySolver};
use fsw_mixture::{Mechanism, MixtureInitializer};
use fsw_results::{AggregatedDataset, SweepManifest, SweepStore, compute_sweep_id, write_csv};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{FlameDef, MixtureDef, SolverDef, SweepConfig, load_config, resolve_path};
use crate::controller::{Execution, FailurePolicy, SweepController, SweepReport};
use crate::error::{AppError, AppResult};
use crate::progress::SweepProgressEvent;

/// Options for running a sweep.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub use_cache: bool,
    pub tool_version: String,
    /// Overrides `run.failure_policy` from the config.
    pub failure_policy: Option<FailurePolicy>,
    /// Overrides `run.execution` from the config.
    pub execution: Option<Execution>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            failure_policy: None,
            execution: None,
        }
    }
}

/// Request to execute a sweep.
pub struct SweepRequest<'a> {
    pub config_path: &'a Path,
    pub options: SweepOptions,
}

/// Response from a sweep execution.
#[derive(Debug, Clone)]
pub struct SweepResponse {
    pub sweep_id: String,
    pub manifest: SweepManifest,
    pub dataset: AggregatedDataset,
    pub loaded_from_cache: bool,
    /// Absent when the sweep was served from the store.
    pub report: Option<SweepReport>,
}

/// Inputs that determine a sweep's results. Output settings are left out so
/// changing them does not invalidate the cache.
#[derive(Serialize)]
struct CacheKey<'a> {
    mechanism: &'a str,
    mixture: &'a MixtureDef,
    equivalence_ratios: Vec<f64>,
    flame: &'a FlameDef,
    solver: &'a SolverDef,
}

pub fn sweep_id_for(config: &SweepConfig, tool_version: &str) -> String {
    let key = CacheKey {
        mechanism: &config.mechanism,
        mixture: &config.mixture,
        equivalence_ratios: config.equivalence_ratios(),
        flame: &config.flame,
        solver: &config.solver,
    };
    let solver = match config.solver {
        SolverDef::Process { .. } => "process",
        SolverDef::Replay { .. } => "replay",
    };
    compute_sweep_id(&key, solver, tool_version)
}

/// Instantiate the configured solver. Relative paths resolve against the
/// config file's directory, which is also the process solver's working
/// directory unless one is given.
pub fn build_solver(solver: &SolverDef, config_path: &Path) -> AppResult<Arc<dyn FlameSolver>> {
    match solver {
        SolverDef::Process {
            command,
            args,
            timeout_s,
            working_dir,
        } => {
            let mut process = ProcessSolver::new(command).with_args(args.clone());
            if let Some(timeout) = timeout_s {
                let timeout = Duration::try_from_secs_f64(*timeout).map_err(|e| {
                    AppError::InvalidInput(format!("solver.timeout_s = {timeout}: {e}"))
                })?;
                process = process.with_timeout(timeout);
            }
            let dir = match working_dir {
                Some(dir) => Some(resolve_path(config_path, dir)),
                None => config_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf),
            };
            if let Some(dir) = dir {
                process = process.with_working_dir(dir);
            }
            Ok(Arc::new(process))
        }
        SolverDef::Replay { dir } => {
            let dir = resolve_path(config_path, dir);
            let replay = ReplaySolver::load_dir(&dir).map_err(AppError::Solver)?;
            info!(recordings = replay.len(), dir = %dir.display(), "loaded replay recordings");
            Ok(Arc::new(replay))
        }
    }
}

/// Execute or load a sweep based on request.
pub fn run_sweep(request: &SweepRequest) -> AppResult<SweepResponse> {
    run_sweep_with_progress(request, None)
}

/// Execute or load a sweep and stream per-run progress events.
pub fn run_sweep_with_progress(
    request: &SweepRequest,
    progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
) -> AppResult<SweepResponse> {
    let config_path = request.config_path;
    let config = load_config(config_path)?;
    let store = SweepStore::for_config(config_path)?;
    let tool_version = &request.options.tool_version;
    let sweep_id = sweep_id_for(&config, tool_version);

    if request.options.use_cache && store.has_sweep(&sweep_id) {
        info!(sweep_id = %sweep_id, "loading cached sweep");
        let manifest = store.load_manifest(&sweep_id)?;
        let dataset = store.load_dataset(&sweep_id)?;
        write_outputs(&config, config_path, &dataset)?;
        return Ok(SweepResponse {
            sweep_id,
            manifest,
            dataset,
            loaded_from_cache: true,
            report: None,
        });
    }

    let mechanism = Arc::new(Mechanism::resolve_reference(
        &config.mechanism,
        config_path.parent(),
    )?);
    let solver = build_solver(&config.solver, config_path)?;
    let initializer = MixtureInitializer::new(Arc::clone(&mechanism), config.mixture.to_spec());
    let adapter = FlameSolverAdapter::new(solver, mechanism);

    let mut controller = SweepController::new(
        initializer,
        adapter,
        config.flame.clone(),
        config.equivalence_ratios(),
    )
    .with_policy(
        request
            .options
            .failure_policy
            .unwrap_or(config.run.failure_policy),
    )
    .with_execution(request.options.execution.unwrap_or(config.run.execution));
    if let Some(dir) = &config.output.record_dir {
        controller = controller.with_record_dir(resolve_path(config_path, dir));
    }

    let report = match controller.run(progress_cb) {
        Ok(report) => report,
        Err(err) => {
            if let AppError::SweepAborted { partial, .. } = &err {
                write_partial_csv(&config, config_path, partial);
            }
            return Err(err);
        }
    };

    let mut manifest = SweepManifest::new(
        sweep_id.clone(),
        config.name.clone(),
        controller.mode(),
        controller.solver_name(),
        tool_version.clone(),
    );
    let dataset = controller.into_dataset();
    manifest.runs = dataset.runs().to_vec();
    manifest.skipped = report.skipped.clone();
    manifest.row_count = dataset.len();

    store.save_sweep(&manifest, &dataset)?;
    info!(sweep_id = %sweep_id, rows = dataset.len(), "saved sweep");
    write_outputs(&config, config_path, &dataset)?;

    Ok(SweepResponse {
        sweep_id,
        manifest,
        dataset,
        loaded_from_cache: false,
        report: Some(report),
    })
}

fn write_outputs(config: &SweepConfig, config_path: &Path, dataset: &AggregatedDataset) -> AppResult<()> {
    if let Some(csv) = &config.output.csv {
        let path = resolve_path(config_path, csv);
        write_csv(dataset, &path)?;
        info!(path = %path.display(), rows = dataset.len(), "wrote csv");
    }
    if let Some(dir) = &config.output.chart_dir {
        plot_sweep(dataset, &config.chart_requests(), &resolve_path(config_path, dir))?;
    }
    Ok(())
}

// An aborted sweep is never stored, but the rows it produced still reach the CSV.
fn write_partial_csv(config: &SweepConfig, config_path: &Path, partial: &AggregatedDataset) {
    let Some(csv) = &config.output.csv else {
        return;
    };
    let path = resolve_path(config_path, csv);
    match write_csv(partial, &path) {
        Ok(()) => warn!(
            path = %path.display(),
            runs = partial.run_count(),
            rows = partial.len(),
            "sweep aborted, wrote partial csv"
        ),
        Err(err) => warn!(path = %path.display(), error = %err, "failed to write partial csv"),
    }
}

/// List all stored sweeps for a config, newest first.
pub fn list_sweeps(config_path: &Path) -> AppResult<Vec<SweepManifest>> {
    let store = SweepStore::for_config(config_path)?;
    Ok(store.list_sweeps()?)
}

/// Load a stored sweep.
pub fn load_sweep(config_path: &Path, sweep_id: &str) -> AppResult<(SweepManifest, AggregatedDataset)> {
    let store = SweepStore::for_config(config_path)?;
    let manifest = store.load_manifest(sweep_id)?;
    let dataset = store.load_dataset(sweep_id)?;
    Ok((manifest, dataset))
}

/// Write a stored sweep as CSV. Returns the number of rows written.
pub fn export_csv(config_path: &Path, sweep_id: &str, out: &Path) -> AppResult<usize> {
    let (_manifest, dataset) = load_sweep(config_path, sweep_id)?;
    write_csv(&dataset, out)?;
    Ok(dataset.len())
}

/// Render every requested chart, then the velocity profile, as SVG files in `out_dir`.
pub fn plot_sweep(
    dataset: &AggregatedDataset,
    requests: &[ChartRequest],
    out_dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    let mut sink = SvgChartSink::new(out_dir)?;
    ChartRenderer::render(dataset, requests, &mut sink)?;
    Ok(sink.written().to_vec())
}
