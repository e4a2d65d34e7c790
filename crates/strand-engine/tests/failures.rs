//! Integration tests: solver non-convergence, hard failures, poisoning
//! and recovery through `restore`.

use strand_core::{
    ConnectivityError, FilamentId, Link, MarkerId, SolverError, StepError, StepId, Vec3,
};
use strand_engine::{FluidState, Integrator, IntegratorConfig};
use strand_grid::BlockDecomposition;
use strand_markers::Marker;
use strand_test_utils::{flagellum_spec, unit_box, PeriodicStokes, RecordingSolver};

type Engine = Integrator<RecordingSolver, PeriodicStokes, BlockDecomposition>;

fn engine(solver: RecordingSolver) -> (Engine, FluidState) {
    let g = unit_box(16);
    let d = BlockDecomposition::new(&g, [2, 1, 1]).unwrap();
    let config = IntegratorConfig {
        filaments: vec![flagellum_spec(Vec3::new(0.25, 0.5, 0.5))],
        ..IntegratorConfig::default()
    };
    let fluid = FluidState::at_rest(&g);
    let engine = Integrator::new(config, g, d, solver, PeriodicStokes::default()).unwrap();
    (engine, fluid)
}

fn markers(engine: &Engine) -> Vec<Marker> {
    engine.store().iter().cloned().collect()
}

#[test]
fn non_converged_solve_is_reported_not_fatal() {
    let (mut engine, mut fluid) = engine(RecordingSolver::non_converging(1.0e-3));
    let report = engine.step(&mut fluid).unwrap();
    assert!(!report.converged());
    assert_eq!(report.predictor.residual_norm, 1.0e-3);
    assert_eq!(report.corrector.iterations, 100);
    assert!(!engine.is_poisoned());
    engine.step(&mut fluid).unwrap();
    assert_eq!(engine.step_id(), StepId(2));
}

#[test]
fn solver_failure_poisons_and_leaves_fluid_untouched() {
    let err = SolverError::NonFinite {
        residual_norm: f64::INFINITY,
    };
    let (mut engine, mut fluid) = engine(RecordingSolver::failing_on(1, err.clone()));
    let before = fluid.clone();
    let saved = markers(&engine);

    match engine.step(&mut fluid) {
        Err(StepError::Solver(e)) => assert_eq!(e, err),
        other => panic!("expected Solver error, got {other:?}"),
    }
    assert_eq!(fluid, before);
    assert!(engine.is_poisoned());
    assert_eq!(engine.step_id(), StepId(0));
    assert_eq!(engine.time(), 0.0);

    match engine.step(&mut fluid) {
        Err(StepError::Poisoned) => {}
        other => panic!("expected Poisoned, got {other:?}"),
    }
    // Only the failing corrector call reached the solver.
    assert_eq!(engine.solver().calls.len(), 2);

    engine.restore(saved, StepId(0), 0.0).unwrap();
    assert!(!engine.is_poisoned());
    engine.step(&mut fluid).unwrap();
    assert_eq!(engine.step_id(), StepId(1));
}

#[test]
fn stretched_link_is_a_connectivity_error() {
    let (mut engine, mut fluid) = engine(RecordingSolver::new());
    let mut broken = markers(&engine);
    for m in &mut broken {
        if m.sequence_index >= 4 {
            m.position.y += 0.2;
        }
    }
    engine.restore(broken, StepId(0), 0.0).unwrap();

    let before = fluid.clone();
    match engine.step(&mut fluid) {
        Err(StepError::Connectivity(ConnectivityError::Broken {
            filament,
            sequence_index,
            missing,
            ..
        })) => {
            assert_eq!(filament, FilamentId(0));
            assert!(
                (sequence_index == 3 && missing == Link::Next)
                    || (sequence_index == 4 && missing == Link::Prev),
                "index {sequence_index}, missing {missing}"
            );
        }
        other => panic!("expected Connectivity error, got {other:?}"),
    }
    assert!(engine.is_poisoned());
    assert_eq!(fluid, before);
    assert!(engine.solver().calls.is_empty());
}

#[test]
fn restore_rejects_incomplete_filament() {
    let (mut engine, _) = engine(RecordingSolver::new());
    let partial: Vec<Marker> = markers(&engine)
        .into_iter()
        .filter(|m| m.id != MarkerId(5))
        .collect();
    match engine.restore(partial, StepId(3), 3.0e-4) {
        Err(StepError::Sequence(_)) => {}
        other => panic!("expected Sequence error, got {other:?}"),
    }
    assert_eq!(engine.step_id(), StepId(0));
    assert_eq!(engine.store().len(), 8);
}

#[test]
fn stale_predictor_fields_do_not_leak_into_a_step() {
    let (mut clean, mut fluid_clean) = engine(RecordingSolver::new());
    let (mut stale, mut fluid_stale) = engine(RecordingSolver::new());

    let mut garbage = markers(&stale);
    for m in &mut garbage {
        m.pred_velocity = Vec3::splat(1.0e3);
        m.pred_force = Vec3::splat(1.0e9);
        m.velocity = Vec3::splat(-7.0);
        m.force = Vec3::splat(4.0e8);
    }
    stale.restore(garbage, StepId(0), 0.0).unwrap();

    clean.step(&mut fluid_clean).unwrap();
    stale.step(&mut fluid_stale).unwrap();

    assert_eq!(clean.solver().calls[0].rhs, stale.solver().calls[0].rhs);
    assert_eq!(clean.solver().calls[1].rhs, stale.solver().calls[1].rhs);
    assert_eq!(fluid_clean, fluid_stale);
    assert_eq!(markers(&clean), markers(&stale));
}
