use clap::{Parser, Subcommand};
use fsw_app::{
    AppError, AppResult, Execution, FailurePolicy, SweepOptions, SweepProgressEvent, SweepRequest,
    SweepResponse, service, validate_config,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flamesweep")]
#[command(about = "flamesweep - equivalence-ratio sweeps of 1-D premixed flames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate sweep file syntax and settings
    Validate {
        /// Path to the sweep YAML file
        config_path: PathBuf,
    },
    /// Run a sweep
    Run {
        /// Path to the sweep YAML file
        config_path: PathBuf,
        /// Run on this many worker threads
        #[arg(long, value_name = "WORKERS")]
        parallel: Option<usize>,
        /// Record failing runs and continue instead of aborting
        #[arg(long)]
        skip_failed: bool,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored sweeps for a config
    Runs {
        /// Path to the sweep YAML file
        config_path: PathBuf,
    },
    /// Show details of a stored sweep
    Show {
        /// Path to the sweep YAML file
        config_path: PathBuf,
        /// Sweep ID to display
        sweep_id: String,
    },
    /// Export the aggregated table of a stored sweep as CSV
    Export {
        /// Path to the sweep YAML file
        config_path: PathBuf,
        /// Sweep ID
        sweep_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the charts of a stored sweep as SVG
    Plot {
        /// Path to the sweep YAML file
        config_path: PathBuf,
        /// Sweep ID
        sweep_id: String,
        /// Output directory
        #[arg(short, long, default_value = "charts")]
        output: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            parallel,
            skip_failed,
            no_cache,
        } => cmd_run(&config_path, parallel, skip_failed, !no_cache),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::Show {
            config_path,
            sweep_id,
        } => cmd_show(&config_path, &sweep_id),
        Commands::Export {
            config_path,
            sweep_id,
            output,
        } => cmd_export(&config_path, &sweep_id, output.as_deref()),
        Commands::Plot {
            config_path,
            sweep_id,
            output,
        } => cmd_plot(&config_path, &sweep_id, &output),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating sweep: {}", config_path.display());
    let config = fsw_app::load_config(config_path)?;
    validate_config(&config)?;
    let phis = config.equivalence_ratios();
    println!("✓ Sweep is valid");
    println!("  Name: {}", config.name);
    println!("  Mechanism: {}", config.mechanism);
    println!("  Mode: {}", config.flame.kind());
    println!("  Runs: {} ({:?})", phis.len(), phis);
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    parallel: Option<usize>,
    skip_failed: bool,
    use_cache: bool,
) -> AppResult<()> {
    println!("Running sweep: {}", config_path.display());
    debug!(?parallel, skip_failed, use_cache, "run options");

    let request = SweepRequest {
        config_path,
        options: SweepOptions {
            use_cache,
            failure_policy: skip_failed.then_some(FailurePolicy::SkipAndContinue),
            execution: parallel.map(|workers| Execution::Parallel { workers }),
            ..SweepOptions::default()
        },
    };

    let response = service::run_sweep_with_progress(
        &request,
        Some(&mut |event: SweepProgressEvent| render_cli_progress(&event)),
    );
    clear_progress_line();
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            if let AppError::SweepAborted { partial, .. } = &err {
                println!(
                    "✗ Sweep aborted; kept {} completed runs ({} rows)",
                    partial.run_count(),
                    partial.len()
                );
            }
            return Err(err);
        }
    };

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.sweep_id);
    } else {
        println!("✓ Sweep completed: {}", response.sweep_id);
    }
    print_sweep_summary(&response);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &SweepProgressEvent) {
    match event {
        SweepProgressEvent::RunStarted {
            index,
            total,
            phi,
            elapsed_wall_s,
        } => {
            let width = 28usize;
            let done = index.saturating_sub(1);
            let filled = (done * width) / (*total).max(1);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {}/{}  phi={:.3}  elapsed={:.1}s",
                bar, index, total, phi, elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        SweepProgressEvent::RunCompleted {
            index,
            total,
            phi,
            laminar_burning_velocity,
            ..
        } => {
            clear_progress_line();
            println!(
                "  ✓ {:>3}/{}  phi = {:<6}  S_L = {:.4} m/s",
                index, total, phi, laminar_burning_velocity
            );
        }
        SweepProgressEvent::RunSkipped {
            index,
            total,
            phi,
            error,
            ..
        } => {
            clear_progress_line();
            println!("  ✗ {:>3}/{}  phi = {:<6}  skipped: {}", index, total, phi, error);
        }
    }
}

fn print_sweep_summary(response: &SweepResponse) {
    let manifest = &response.manifest;
    println!("  Name: {}", manifest.name);
    println!("  Mode: {}", manifest.mode);
    println!("  Runs: {}", manifest.runs.len());
    println!("  Rows: {}", manifest.row_count);
    if let Some(report) = &response.report {
        println!("  Elapsed: {:.2}s", report.elapsed_wall_s);
    }
    if !manifest.skipped.is_empty() {
        println!("  Skipped:");
        for skipped in &manifest.skipped {
            println!(
                "    #{} phi = {}: {}",
                skipped.index, skipped.equivalence_ratio, skipped.error
            );
        }
    }
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let sweeps = service::list_sweeps(config_path)?;

    if sweeps.is_empty() {
        println!("No stored sweeps found for: {}", config_path.display());
    } else {
        println!("Stored sweeps for '{}':", config_path.display());
        for manifest in sweeps {
            println!(
                "  {} {} ({}, {} runs, {})",
                manifest.sweep_id,
                manifest.name,
                manifest.mode,
                manifest.runs.len(),
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show(config_path: &Path, sweep_id: &str) -> AppResult<()> {
    println!("Loading sweep: {}", sweep_id);
    let (manifest, dataset) = service::load_sweep(config_path, sweep_id)?;

    println!("\nSweep Summary:");
    println!("  Name: {}", manifest.name);
    println!("  Mode: {}", manifest.mode);
    println!("  Solver: {}", manifest.solver);
    println!("  Created: {}", manifest.timestamp);
    println!("  Rows: {}", dataset.len());

    println!("\nRuns:");
    println!("  {:>3}  {:>8}  {:>8}  {:>14}  {:>14}", "#", "phi", "points", "S_L [m/s]", "L_f [m]");
    for run in dataset.runs() {
        let flame_length = run
            .metrics
            .flame_length
            .map(|v| format!("{:.6}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3}  {:>8.3}  {:>8}  {:>14.6}  {:>14}",
            run.run_index + 1,
            run.equivalence_ratio,
            run.row_count,
            run.metrics.laminar_burning_velocity,
            flame_length
        );
    }
    for skipped in &manifest.skipped {
        println!(
            "  {:>3}  {:>8.3}  skipped: {}",
            skipped.index, skipped.equivalence_ratio, skipped.error
        );
    }
    Ok(())
}

fn cmd_export(config_path: &Path, sweep_id: &str, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let rows = service::export_csv(config_path, sweep_id, path)?;
        println!("✓ Exported {} rows to {}", rows, path.display());
    } else {
        let (_manifest, dataset) = service::load_sweep(config_path, sweep_id)?;
        print!("{}", fsw_results::to_csv(&dataset));
    }
    Ok(())
}

fn cmd_plot(config_path: &Path, sweep_id: &str, output: &Path) -> AppResult<()> {
    let config = fsw_app::load_config(config_path)?;
    let (_manifest, dataset) = service::load_sweep(config_path, sweep_id)?;
    let written = service::plot_sweep(&dataset, &config.chart_requests(), output)?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!("✓ Wrote {} charts to {}", written.len(), output.display());
    Ok(())
}
