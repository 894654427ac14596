use approx::assert_relative_eq;
use ar3::nalgebra::{dvector, DVector};
use ar3::testing::*;
use ar3::{
    Ar3, ConvergenceTest, DataFault, DerivativePart, Reference, RegularizationPolicy, RunConfig,
    RunResult, SolverDriver, StepOutcome, Termination,
};

fn starts<F: TestObjective>(f: &F) -> Vec<DVector<f64>> {
    let mut starts = f.initials();
    starts.push(f.domain().lower().clone());
    starts.push(f.domain().upper().clone());
    starts
}

fn check_history(result: &RunResult) {
    let history = result.history();

    assert!(history.is_consistent());
    assert_eq!(result.iterations(), history.len());

    for (k, outcome) in history.outcomes().iter().enumerate() {
        let (before, after) = (history.f()[k], history.f()[k + 1]);

        if outcome.is_accepted() {
            assert!(after < before, "accepted step did not decrease f");
        } else {
            assert_eq!(after, before, "f changed without an accepted step");
        }
    }
}

fn check_all<F, P>(f: &F, solver: &Ar3<P>, check: impl Fn(&RunResult))
where
    F: TestObjective,
    P: RegularizationPolicy,
{
    for x0 in starts(f) {
        let result = solver.run(f, &x0);
        check_history(&result);
        check(&result);
    }
}

fn config() -> RunConfig {
    let mut config = RunConfig::default();
    config.set_max_iterations(40);
    config
}

#[test]
fn history_invariants_ar3() {
    let mut config = config();
    config.set_sigma_floor(1e-4).set_sigma_ceiling(1e4);
    let solver = Ar3::with_config(config).unwrap();

    let within = |result: &RunResult| {
        assert!(result
            .history()
            .sigma()
            .iter()
            .all(|&sigma| (1e-4..=1e4).contains(&sigma)));
    };

    check_all(&QuadraticBowl::default(), &solver, within);
    check_all(&DoubleWell, &solver, within);
    check_all(&Rosenbrock::default(), &solver, within);
    check_all(&Himmelblau, &solver, within);
}

#[test]
fn history_invariants_unregularized() {
    let solver = Ar3::unregularized(config()).unwrap();

    let zero = |result: &RunResult| {
        assert!(result.history().sigma().iter().all(|&sigma| sigma == 0.0));
    };

    check_all(&QuadraticBowl::default(), &solver, zero);
    check_all(&DoubleWell, &solver, zero);
    check_all(&Rosenbrock::default(), &solver, zero);
    check_all(&Himmelblau, &solver, zero);
}

#[test]
fn weight_follows_outcomes() {
    let mut config = config();
    config.set_sigma_initial(0.01);
    let solver = Ar3::with_config(config).unwrap();

    for x0 in starts(&DoubleWell) {
        let result = solver.run(&DoubleWell, &x0);
        let history = result.history();

        for (k, outcome) in history.outcomes().iter().enumerate() {
            let (before, after) = (history.sigma()[k], history.sigma()[k + 1]);

            if outcome.is_accepted() {
                assert!(after <= before);
            } else {
                assert!(after >= before);
            }
        }
    }
}

#[test]
fn runs_are_deterministic() {
    let f = Himmelblau;
    let solver = Ar3::with_config(config()).unwrap();

    for x0 in f.initials() {
        let first = solver.run(&f, &x0);
        let second = solver.run(&f, &x0);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }
}

#[test]
fn converged_points_are_stationary() {
    let f = DoubleWell;
    let solver = Ar3::with_config(config()).unwrap();

    for x0 in f.initials() {
        let result = solver.run(&f, &x0);

        if result.converged() {
            assert!(f.is_optimum(result.x(), 1e-6));
            assert_relative_eq!(result.value(), f.minimum(), epsilon = 1e-10);
        }
    }
}

#[test]
fn value_change_test_needs_accepted_step() {
    let mut config = config();
    config.set_convergence(ConvergenceTest::ValueChange);

    let f = QuadraticBowl::default();
    let result = Ar3::with_config(config)
        .unwrap()
        .run(&f, &dvector![0.0, 0.0]);

    // Zero gradient gives a zero step, which is never a decrease.
    assert!(!result.converged());
    assert!(result
        .history()
        .outcomes()
        .iter()
        .all(|outcome| !outcome.is_accepted()));
}

#[test]
fn stationary_start_through_driver() {
    let f = QuadraticBowl::new(dvector![0.25, 0.75]);
    let driver = SolverDriver::builder(&f)
        .with_initial(vec![0.25, 0.75])
        .build()
        .unwrap();

    let result = driver.run();

    assert_eq!(result.termination(), &Termination::Converged);
    assert_eq!(result.iterations(), 0);
    assert_eq!(result.x(), &dvector![0.25, 0.75]);
    assert_eq!(result.history().f(), &[0.0]);
    assert_eq!(result.history().sigma(), &[1.0]);
    assert!(result.history().outcomes().is_empty());
    assert!(result.history().sigma_approx().is_empty());
}

#[test]
fn data_fault_through_driver() {
    let f = FaultAfter::new(QuadraticBowl::default(), 2);
    let driver = SolverDriver::builder(&f)
        .with_initial(vec![1.0, 1.0])
        .build()
        .unwrap();

    let result = driver.run();

    match result.termination() {
        Termination::DataFault {
            iteration: 1,
            fault: DataFault::NonFinite { part, .. },
        } => assert_eq!(*part, DerivativePart::Gradient),
        other => panic!("unexpected termination {:?}", other),
    }

    assert_eq!(result.history().outcomes(), &[StepOutcome::Accepted]);
    assert_eq!(f.calls(), 2);
}

#[test]
fn result_serialization() {
    let f = DoubleWell;
    let mut config = RunConfig::default();
    config.set_sigma_initial(0.01);

    let result = Ar3::with_config(config)
        .unwrap()
        .run(&f, &dvector![0.0, 1.0]);

    let json = serde_json::to_string(&result).unwrap();
    let back: RunResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back.termination(), result.termination());
    assert_eq!(back.iterations(), result.iterations());
    assert_eq!(back.history().outcomes(), result.history().outcomes());

    for (a, b) in back.history().f().iter().zip(result.history().f()) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["termination"], "converged");
    assert_eq!(value["history"]["outcomes"][0]["status"], "rejected");
}

#[test]
fn config_serialization() {
    let config: RunConfig =
        serde_json::from_str(r#"{ "max_iterations": 7, "convergence": "value-change" }"#).unwrap();

    assert_eq!(config.max_iterations(), 7);
    assert_eq!(config.convergence(), ConvergenceTest::ValueChange);
    assert_eq!(config.eta(), 0.1);
    assert!(Ar3::with_config(config).is_ok());
}
