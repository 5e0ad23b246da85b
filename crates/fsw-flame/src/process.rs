//! External-process solver bridge.
//!
//! Protocol: the child receives one JSON [`SolveRequest`] on stdin and prints
//! one JSON reply on stdout, tagged by `status`:
//!
//! ```text
//! {"status": "converged", "profiles": {"grid": [...], "fuel_mole_fraction": [...], ...}}
//! {"status": "diverged", "message": "..."}
//! {"status": "mechanism_error", "message": "..."}
//! ```
//!
//! Anything else the child prints before the reply is ignored as long as the
//! reply sits on the last non-empty line.

use crate::config::{FlameConfig, RefineCriteria, SolverMode};
use crate::error::{FlameError, FlameResult};
use crate::solution::{FlameProfiles, FlameSolution};
use crate::solver::FlameSolver;
use fsw_mixture::MixtureState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Request written to the child's stdin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub mechanism: String,
    pub fuel: String,
    pub equivalence_ratio: f64,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub mole_fractions: BTreeMap<String, f64>,
    pub mode: SolverMode,
    pub refine: RefineCriteria,
    pub refine_grid: bool,
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step_factor: Option<f64>,
}

impl SolveRequest {
    pub fn new(mixture: &MixtureState, config: &FlameConfig) -> Self {
        Self {
            mechanism: mixture.mechanism().to_string(),
            fuel: mixture.fuel().to_string(),
            equivalence_ratio: mixture.equivalence_ratio(),
            temperature_k: mixture.temperature().value,
            pressure_pa: mixture.pressure().value,
            mole_fractions: mixture
                .composition()
                .iter()
                .map(|(s, x)| (s.to_string(), x))
                .collect(),
            mode: config.mode.clone(),
            refine: config.refine,
            refine_grid: config.refine_grid,
            auto: config.auto,
            time_step_factor: config.time_step_factor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum SolveReply {
    Converged {
        profiles: FlameProfiles,
    },
    Diverged {
        #[serde(default)]
        message: String,
    },
    MechanismError {
        #[serde(default)]
        message: String,
    },
}

/// Runs an external program per flame solve.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessSolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Bound the whole call. The child is killed when the limit expires.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn spawn(&self) -> FlameResult<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.spawn().map_err(|e| FlameError::Backend {
            message: format!("failed to start '{}': {}", self.program.display(), e),
        })
    }

    fn wait(&self, child: &mut Child) -> FlameResult<std::process::ExitStatus> {
        let started = Instant::now();
        loop {
            let status = child.try_wait().map_err(|e| FlameError::Backend {
                message: format!("failed to poll solver process: {}", e),
            })?;
            if let Some(status) = status {
                return Ok(status);
            }
            if let Some(limit) = self.timeout
                && started.elapsed() >= limit
            {
                warn!(
                    program = %self.program.display(),
                    timeout_s = limit.as_secs_f64(),
                    "solver process timed out, killing"
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(FlameError::Timeout {
                    seconds: limit.as_secs_f64(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut out = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut out);
        }
        out
    })
}

fn parse_reply(stdout: &str) -> FlameResult<SolveReply> {
    if let Ok(reply) = serde_json::from_str(stdout.trim()) {
        return Ok(reply);
    }
    let last_line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    serde_json::from_str(last_line.trim()).map_err(|e| FlameError::Backend {
        message: format!("unreadable solver reply: {}", e),
    })
}

fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

impl FlameSolver for ProcessSolver {
    fn name(&self) -> &str {
        "process"
    }

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        let request = SolveRequest::new(mixture, config);
        let payload = serde_json::to_vec(&request).map_err(|e| FlameError::Backend {
            message: format!("failed to encode solver request: {}", e),
        })?;

        let mut child = self.spawn()?;
        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());

        // The request is written off-thread so a child that never drains stdin
        // still falls under the timeout.
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&payload)));

        let status = self.wait(&mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!(
                        program = %self.program.display(),
                        "solver closed stdin before reading the request"
                    );
                }
                Ok(Err(e)) => {
                    return Err(FlameError::Backend {
                        message: format!("failed to send solver request: {}", e),
                    });
                }
                Err(_) => {
                    return Err(FlameError::Backend {
                        message: "solver request writer panicked".to_string(),
                    });
                }
            }
        }
        debug!(
            program = %self.program.display(),
            code = ?status.code(),
            stdout_bytes = stdout.len(),
            "solver process finished"
        );

        if !status.success() {
            return Err(FlameError::Backend {
                message: format!(
                    "solver exited with {}: {}",
                    status,
                    tail(&stderr, 5)
                ),
            });
        }

        match parse_reply(&stdout)? {
            SolveReply::Converged { profiles } => FlameSolution::new(profiles),
            SolveReply::Diverged { message } => Err(FlameError::SolverDivergence { message }),
            SolveReply::MechanismError { message } => Err(FlameError::Mechanism { message }),
        }
    }
}
