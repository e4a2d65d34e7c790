//! Integration test: restart from a snapshot continues bit-for-bit.
//!
//! Run A takes three steps. Run B is built from the same configuration,
//! restored from a snapshot of A after step one (plus a copy of A's
//! fluid at that point) and takes the remaining two. Marker state and
//! fluid must agree exactly.

use strand_core::{Axis, Vec3};
use strand_engine::{FluidState, Integrator, IntegratorConfig};
use strand_forces::Constraint;
use strand_grid::BlockDecomposition;
use strand_snapshot::{compare_snapshots, read_snapshot, write_snapshot, Snapshot};
use strand_test_utils::{flagellum_spec, passive_spec, unit_box, PeriodicStokes};

type Engine = Integrator<PeriodicStokes, PeriodicStokes, BlockDecomposition>;

fn engine() -> (Engine, FluidState) {
    let g = unit_box(16);
    let d = BlockDecomposition::new(&g, [2, 2, 1]).unwrap();
    let config = IntegratorConfig {
        constraints: vec![Constraint::ZeroComponent(Axis::Z)],
        filaments: vec![
            flagellum_spec(Vec3::new(0.25, 0.5, 0.5)),
            passive_spec(Vec3::new(0.7, 0.2, 0.25)),
        ],
        ..IntegratorConfig::default()
    };
    let fluid = FluidState::at_rest(&g);
    let engine = Integrator::new(config, g, d, PeriodicStokes::default(), PeriodicStokes::default())
        .unwrap();
    (engine, fluid)
}

#[test]
fn restored_run_matches_uninterrupted_run() {
    let (mut a, mut fluid_a) = engine();
    a.step(&mut fluid_a).unwrap();

    let snap = Snapshot::capture(a.store(), a.step_id(), a.time());
    let bytes = write_snapshot(Vec::new(), &snap).unwrap();
    let fluid_saved = fluid_a.clone();

    a.step(&mut fluid_a).unwrap();
    a.step(&mut fluid_a).unwrap();

    let (mut b, _) = engine();
    let loaded = read_snapshot(bytes.as_slice()).unwrap();
    b.restore(loaded.markers(), loaded.step(), loaded.header.time)
        .unwrap();
    let mut fluid_b = fluid_saved;
    b.step(&mut fluid_b).unwrap();
    b.step(&mut fluid_b).unwrap();

    assert_eq!(a.step_id(), b.step_id());
    assert_eq!(a.time().to_bits(), b.time().to_bits());
    let end_a = Snapshot::capture(a.store(), a.step_id(), a.time());
    let end_b = Snapshot::capture(b.store(), b.step_id(), b.time());
    assert_eq!(compare_snapshots(&end_a, &end_b), None);
    assert_eq!(fluid_a, fluid_b);
}

#[test]
fn diverged_run_is_detected() {
    let (mut a, mut fluid_a) = engine();
    let (mut b, mut fluid_b) = engine();
    a.step(&mut fluid_a).unwrap();
    fluid_b.velocity.data_mut(Axis::X)[0] = 1.0e-3;
    b.step(&mut fluid_b).unwrap();

    let sa = Snapshot::capture(a.store(), a.step_id(), a.time());
    let sb = Snapshot::capture(b.store(), b.step_id(), b.time());
    let report = compare_snapshots(&sa, &sb).expect("runs should differ");
    assert!(!report.divergences.is_empty());
}
