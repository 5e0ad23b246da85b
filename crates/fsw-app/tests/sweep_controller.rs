//! Controller behavior against stub solvers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fsw_app::{
    AppError, ErrorKind, Execution, FailurePolicy, FlameDef, FlameModeDef, SweepController,
    SweepProgressEvent,
};
use fsw_core::units::{k, pa};
use fsw_flame::{
    FlameConfig, FlameError, FlameProfiles, FlameResult, FlameSolution, FlameSolver,
    FlameSolverAdapter, SolverMode,
};
use fsw_mixture::{Mechanism, MixtureInitializer, MixtureSpec, MixtureState};

#[derive(Default)]
struct StubSolver {
    fail_at: Vec<f64>,
    empty_at: Vec<f64>,
    /// Sleep longer for smaller phi so completion order is reversed.
    staggered: bool,
    calls: AtomicUsize,
    mass_flows: Mutex<Vec<f64>>,
}

fn profile(phi: f64) -> FlameSolution {
    let n = (phi * 10.0).round() as usize;
    FlameSolution::new(FlameProfiles {
        grid: (0..n).map(|i| i as f64 * 1.0e-3).collect(),
        fuel_mole_fraction: (0..n).map(|i| 0.3 / (1.0 + i as f64)).collect(),
        heat_release_rate: vec![1.0e8; n],
        viscosity: vec![2.0e-5; n],
        temperature: (0..n)
            .map(|i| 2000.0 - (i as f64 - n as f64 / 2.0).abs())
            .collect(),
        velocity: (0..n).map(|i| phi + 0.1 * i as f64).collect(),
    })
    .expect("stub profile")
}

impl FlameSolver for StubSolver {
    fn name(&self) -> &str {
        "stub"
    }

    fn solve(&self, mixture: &MixtureState, config: &FlameConfig) -> FlameResult<FlameSolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let phi = mixture.equivalence_ratio();
        if let SolverMode::BurnerStabilized { mass_flow_rate } = config.mode {
            self.mass_flows.lock().unwrap().push(mass_flow_rate);
        }
        if self.staggered {
            std::thread::sleep(Duration::from_millis((40.0 / phi) as u64));
        }
        if self.fail_at.contains(&phi) {
            return Err(FlameError::SolverDivergence {
                message: format!("no convergence at phi = {phi}"),
            });
        }
        if self.empty_at.contains(&phi) {
            return Ok(FlameSolution::new(FlameProfiles::default()).unwrap());
        }
        Ok(profile(phi))
    }
}

fn spec(fuel: &str) -> MixtureSpec {
    MixtureSpec::new(fuel, "O2:1, N2:3.76", k(300.0), pa(101_325.0))
}

fn controller(
    solver: Arc<StubSolver>,
    mode: FlameModeDef,
    phis: Vec<f64>,
    fuel: &str,
) -> SweepController {
    let mechanism = Arc::new(Mechanism::gri30());
    let initializer = MixtureInitializer::new(Arc::clone(&mechanism), spec(fuel));
    let adapter = FlameSolverAdapter::new(solver, mechanism);
    SweepController::new(initializer, adapter, FlameDef::new(mode), phis)
}

fn burner() -> FlameModeDef {
    FlameModeDef::BurnerStabilized {
        mass_flux_kg_m2_s: Some(0.4),
        inlet_velocity_m_s: None,
    }
}

#[test]
fn rows_follow_sweep_order_with_progress() {
    let solver = Arc::new(StubSolver::default());
    let mut ctl = controller(solver, burner(), vec![0.5, 1.0, 1.5], "H2");
    let mut events = Vec::new();
    let report = ctl
        .run(Some(&mut |e| events.push(e)))
        .expect("sweep should complete");

    assert_eq!(report.total, 3);
    assert_eq!(report.completed, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.row_count, 5 + 10 + 15);

    let ds = ctl.dataset();
    assert_eq!(ds.len(), 30);
    let groups = ds.groups();
    let phis: Vec<f64> = groups.iter().map(|g| g.equivalence_ratio).collect();
    assert_eq!(phis, vec![0.5, 1.0, 1.5]);
    assert_eq!(groups[1].rows.len(), 10);

    assert_eq!(events.len(), 6);
    for (i, pair) in events.chunks(2).enumerate() {
        assert!(matches!(pair[0], SweepProgressEvent::RunStarted { .. }));
        assert!(matches!(pair[1], SweepProgressEvent::RunCompleted { .. }));
        assert_eq!(pair[0].index(), i + 1);
        assert_eq!(pair[1].total(), 3);
    }
}

#[test]
fn burning_velocity_boundary_depends_on_mode() {
    let solver = Arc::new(StubSolver::default());
    let mut ctl = controller(solver, burner(), vec![1.0], "H2");
    ctl.run(None).unwrap();
    let run = ctl.dataset().runs()[0];
    assert!((run.metrics.laminar_burning_velocity - (1.0 + 0.9)).abs() < 1e-12);
    assert_eq!(run.metrics.flame_length, None);

    let solver = Arc::new(StubSolver::default());
    let mut ctl = controller(solver, FlameModeDef::FreelyPropagating, vec![1.0], "H2");
    ctl.run(None).unwrap();
    let run = ctl.dataset().runs()[0];
    assert_eq!(run.metrics.laminar_burning_velocity, 1.0);
    // temperature peaks at the middle grid point
    assert_eq!(run.metrics.flame_length, Some(5.0e-3));
}

#[test]
fn fail_fast_keeps_rows_before_failure() {
    let solver = Arc::new(StubSolver {
        fail_at: vec![1.0],
        ..Default::default()
    });
    let mut ctl = controller(Arc::clone(&solver), burner(), vec![0.5, 1.0, 1.5, 2.0], "H2");
    let err = ctl.run(None).unwrap_err();

    match &err {
        AppError::SweepAborted {
            index,
            phi,
            kind,
            partial,
            ..
        } => {
            assert_eq!(*index, 2);
            assert_eq!(*phi, 1.0);
            assert_eq!(*kind, ErrorKind::SolverDivergence);
            assert_eq!(partial.run_count(), 1);
            assert_eq!(partial.len(), 5);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(err.to_string().contains("phi = 1"));
    assert_eq!(solver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(ctl.dataset().run_count(), 1);
    assert_eq!(ctl.dataset().len(), 5);
}

#[test]
fn skip_and_continue_records_failures() {
    let solver = Arc::new(StubSolver {
        fail_at: vec![1.0],
        empty_at: vec![2.0],
        ..Default::default()
    });
    let mut ctl = controller(solver, burner(), vec![0.5, 1.0, 1.5, 2.0], "H2")
        .with_policy(FailurePolicy::SkipAndContinue);
    let mut events = Vec::new();
    let report = ctl.run(Some(&mut |e| events.push(e))).unwrap();

    assert_eq!(report.completed, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].index, 2);
    assert_eq!(report.skipped[1].equivalence_ratio, 2.0);
    assert!(report.skipped[1].error.contains("Empty profile"));
    assert_eq!(ctl.dataset().len(), 5 + 15);

    let skipped: Vec<usize> = events
        .iter()
        .filter(|e| matches!(e, SweepProgressEvent::RunSkipped { .. }))
        .map(|e| e.index())
        .collect();
    assert_eq!(skipped, vec![2, 4]);
}

#[test]
fn empty_profile_aborts_with_its_kind() {
    let solver = Arc::new(StubSolver {
        empty_at: vec![0.5],
        ..Default::default()
    });
    let mut ctl = controller(solver, burner(), vec![0.5, 1.0], "H2");
    match ctl.run(None).unwrap_err() {
        AppError::SweepAborted { index, kind, .. } => {
            assert_eq!(index, 1);
            assert_eq!(kind, ErrorKind::EmptyProfile);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(ctl.dataset().is_empty());
}

#[test]
fn unknown_fuel_is_invalid_mixture_spec() {
    let solver = Arc::new(StubSolver::default());
    let mut ctl = controller(Arc::clone(&solver), burner(), vec![1.0], "UNOBTAINIUM");
    match ctl.run(None).unwrap_err() {
        AppError::SweepAborted { kind, .. } => assert_eq!(kind, ErrorKind::InvalidMixtureSpec),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(solver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn inlet_velocity_is_converted_per_run() {
    let solver = Arc::new(StubSolver::default());
    let mode = FlameModeDef::BurnerStabilized {
        mass_flux_kg_m2_s: None,
        inlet_velocity_m_s: Some(0.5),
    };
    let mut ctl = controller(Arc::clone(&solver), mode, vec![0.5, 2.0], "H2");
    ctl.run(None).unwrap();

    let mechanism = Arc::new(Mechanism::gri30());
    let init = MixtureInitializer::new(mechanism, spec("H2"));
    let expected: Vec<f64> = [0.5, 2.0]
        .iter()
        .map(|&phi| 0.5 * init.initialize(phi).unwrap().density().value)
        .collect();
    let seen = solver.mass_flows.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    for (a, b) in seen.iter().zip(&expected) {
        assert!((a - b).abs() < 1e-12);
    }
    // richer hydrogen mixtures are lighter
    assert!(seen[1] < seen[0]);
}

#[test]
fn parallel_output_order_equals_sweep_order() {
    let phis = vec![0.4, 0.6, 0.8, 1.0, 1.2, 1.4];

    let sequential = {
        let mut ctl = controller(Arc::new(StubSolver::default()), burner(), phis.clone(), "H2");
        ctl.run(None).unwrap();
        ctl.into_dataset()
    };

    let solver = Arc::new(StubSolver {
        staggered: true,
        ..Default::default()
    });
    let mut ctl = controller(solver, burner(), phis.clone(), "H2")
        .with_execution(Execution::Parallel { workers: 3 });
    let mut events = Vec::new();
    let report = ctl.run(Some(&mut |e| events.push(e))).unwrap();

    assert_eq!(report.completed, phis.len());
    assert_eq!(ctl.dataset(), &sequential);

    let completed: Vec<usize> = events
        .iter()
        .filter(|e| matches!(e, SweepProgressEvent::RunCompleted { .. }))
        .map(|e| e.index())
        .collect();
    assert_eq!(completed, vec![1, 2, 3, 4, 5, 6]);
    let started = events
        .iter()
        .filter(|e| matches!(e, SweepProgressEvent::RunStarted { .. }))
        .count();
    assert_eq!(started, phis.len());
}

#[test]
fn parallel_fail_fast_keeps_only_a_prefix() {
    let phis = vec![0.4, 0.6, 0.8, 1.0, 1.2, 1.4, 1.6, 1.8];
    let solver = Arc::new(StubSolver {
        fail_at: vec![1.0],
        ..Default::default()
    });
    let mut ctl = controller(solver, burner(), phis.clone(), "H2")
        .with_execution(Execution::Parallel { workers: 2 });
    let err = ctl.run(None).unwrap_err();

    let ds = ctl.dataset();
    match err {
        AppError::SweepAborted {
            index, phi, partial, ..
        } => {
            assert_eq!(index, 4);
            assert_eq!(phi, 1.0);
            assert_eq!(*partial, *ds);
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(ds.run_count(), 3);
    let inserted: Vec<f64> = ds.runs().iter().map(|r| r.equivalence_ratio).collect();
    assert_eq!(inserted, phis[..3].to_vec());
}

#[test]
fn parallel_fail_fast_stops_reporting_starts_past_the_failure() {
    let phis = vec![0.4, 0.6, 0.8, 1.0, 1.2, 1.4];
    let solver = Arc::new(StubSolver {
        fail_at: vec![1.0],
        ..Default::default()
    });
    let mut ctl = controller(Arc::clone(&solver), burner(), phis, "H2")
        .with_execution(Execution::Parallel { workers: 1 });
    let mut events = Vec::new();
    let err = ctl.run(Some(&mut |e| events.push(e))).unwrap_err();
    assert!(matches!(err, AppError::SweepAborted { index: 4, .. }));

    let started: Vec<usize> = events
        .iter()
        .filter(|e| matches!(e, SweepProgressEvent::RunStarted { .. }))
        .map(|e| e.index())
        .collect();
    let completed: Vec<usize> = events
        .iter()
        .filter(|e| matches!(e, SweepProgressEvent::RunCompleted { .. }))
        .map(|e| e.index())
        .collect();
    assert_eq!(started, vec![1, 2, 3, 4]);
    assert_eq!(completed, vec![1, 2, 3]);
    assert_eq!(solver.calls.load(Ordering::SeqCst), 4);
}

#[test]
fn parallel_skip_and_continue_matches_sequential() {
    let phis = vec![0.4, 0.6, 0.8, 1.0];
    let solver = Arc::new(StubSolver {
        fail_at: vec![0.6],
        staggered: true,
        ..Default::default()
    });
    let mut ctl = controller(solver, burner(), phis, "H2")
        .with_policy(FailurePolicy::SkipAndContinue)
        .with_execution(Execution::Parallel { workers: 4 });
    let report = ctl.run(None).unwrap();
    assert_eq!(report.completed, 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 2);
    let inserted: Vec<f64> = ctl.dataset().runs().iter().map(|r| r.equivalence_ratio).collect();
    assert_eq!(inserted, vec![0.4, 0.8, 1.0]);
}
