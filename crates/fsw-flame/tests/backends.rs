use fsw_core::units::{constants::one_atm, k};
use fsw_flame::*;
use fsw_mixture::{Mechanism, MixtureSpec, MixtureState, build_mixture};

fn mixture(phi: f64) -> MixtureState {
    let spec = MixtureSpec::new("H2", "O2:1, N2:3.76", k(300.0), one_atm());
    build_mixture(&Mechanism::gri30(), &spec, phi).unwrap()
}

fn profiles() -> FlameProfiles {
    FlameProfiles {
        grid: vec![0.0, 0.01, 0.02],
        fuel_mole_fraction: vec![0.29, 0.1, 0.0],
        heat_release_rate: vec![0.0, 5.0e9, 1.0e7],
        viscosity: vec![1.8e-5, 4.0e-5, 6.5e-5],
        temperature: vec![300.0, 1500.0, 2380.0],
        velocity: vec![2.3, 9.0, 17.5],
    }
}

#[test]
fn replay_serves_recorded_runs() {
    let dir = std::env::temp_dir().join("fsw_flame_replay_test");
    let _ = std::fs::remove_dir_all(&dir);

    let solution = FlameSolution::new(profiles()).unwrap();
    for phi in [0.8, 1.0] {
        Recording::new(phi, ModeKind::FreelyPropagating, &solution)
            .save_in(&dir)
            .unwrap();
    }

    let solver = ReplaySolver::load_dir(&dir).unwrap();
    assert_eq!(solver.len(), 2);

    let config = FlameConfig::new(SolverMode::FreelyPropagating);
    let sol = solver.solve(&mixture(1.0), &config).unwrap();
    assert_eq!(sol.grid(), solution.grid());

    let err = solver.solve(&mixture(1.4), &config).unwrap_err();
    assert!(matches!(err, FlameError::SolverDivergence { .. }));

    let burner = FlameConfig::new(SolverMode::BurnerStabilized {
        mass_flow_rate: 0.4,
    });
    assert!(solver.solve(&mixture(1.0), &burner).is_err());
}

#[test]
fn request_carries_mixture_and_mode() {
    let state = mixture(0.6);
    let config = FlameConfig::new(SolverMode::BurnerStabilized {
        mass_flow_rate: 0.43,
    });
    let request = fsw_flame::process::SolveRequest::new(&state, &config);
    assert_eq!(request.equivalence_ratio, 0.6);
    assert_eq!(request.temperature_k, 300.0);
    assert_eq!(request.mechanism, "gri30");
    let sum: f64 = request.mole_fractions.values().sum();
    assert!((sum - 1.0).abs() < 1e-12);

    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains("\"mass_flow_rate\":0.43"));
}

#[cfg(unix)]
mod process {
    use super::*;
    use std::time::Duration;

    fn shell(script: &str) -> ProcessSolver {
        ProcessSolver::new("sh").with_args(["-c", script])
    }

    #[test]
    fn converged_reply_becomes_solution() {
        let reply = serde_json::json!({ "status": "converged", "profiles": profiles() });
        let script = format!("cat > /dev/null; echo 'log line'; echo '{}'", reply);
        let sol = shell(&script)
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap();
        assert_eq!(sol.len(), 3);
        let m = compute_metrics(&sol, &SolverMode::FreelyPropagating).unwrap();
        assert_eq!(m.laminar_burning_velocity, 2.3);
        assert_eq!(m.flame_length, Some(0.02));
    }

    #[test]
    fn diverged_reply_is_divergence() {
        let script = r#"cat > /dev/null; echo '{"status":"diverged","message":"newton failed"}'"#;
        let err = shell(script)
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap_err();
        assert_eq!(
            err,
            FlameError::SolverDivergence {
                message: "newton failed".into()
            }
        );
    }

    #[test]
    fn mechanism_reply_is_mechanism_error() {
        let script =
            r#"cat > /dev/null; echo '{"status":"mechanism_error","message":"no species X"}'"#;
        let err = shell(script)
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap_err();
        assert!(matches!(err, FlameError::Mechanism { .. }));
    }

    #[test]
    fn non_zero_exit_is_backend_error() {
        let err = shell("cat > /dev/null; echo boom >&2; exit 3")
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap_err();
        match err {
            FlameError::Backend { message } => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn solver_that_closes_stdin_still_converges() {
        let reply = serde_json::json!({ "status": "converged", "profiles": profiles() });
        let script = format!("exec 0<&-; sleep 0.1; echo '{}'", reply);
        let sol = shell(&script)
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap();
        assert_eq!(sol.len(), 3);
    }

    #[test]
    fn timeout_holds_when_stdin_is_never_read() {
        let started = std::time::Instant::now();
        let err = shell("exec sleep 5")
            .with_timeout(Duration::from_millis(200))
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap_err();
        assert!(matches!(err, FlameError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn slow_solver_times_out() {
        let err = shell("sleep 5")
            .with_timeout(Duration::from_millis(200))
            .solve(&mixture(1.0), &FlameConfig::new(SolverMode::FreelyPropagating))
            .unwrap_err();
        assert!(matches!(err, FlameError::Timeout { .. }));
    }
}
