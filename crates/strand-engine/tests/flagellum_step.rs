//! Integration test: one step of the reference flagellum.
//!
//! An 8-marker actuated filament in a 16³ triply periodic unit box,
//! straddling two subdomains of a 2×2×1 decomposition, fluid at rest.
//! After one step the out-of-plane coordinate must be untouched, the
//! sequence invariant must hold, and interior forces must respect the
//! bound implied by the stiffnesses and the link/bending residuals of
//! the two stage geometries.

use strand_core::{Axis, DomainDecomposition, Vec3};
use strand_engine::{FluidState, Integrator, IntegratorConfig};
use strand_forces::{bending_rotation, target_angle, Constraint};
use strand_grid::BlockDecomposition;
use strand_markers::{FilamentSpec, Marker, Stage};
use strand_test_utils::{flagellum_spec, unit_box, PeriodicStokes};

const ORIGIN: Vec3 = Vec3::new(0.25, 0.5, 0.5);

type Engine = Integrator<PeriodicStokes, PeriodicStokes, BlockDecomposition>;

fn engine() -> (Engine, FluidState) {
    let g = unit_box(16);
    let d = BlockDecomposition::new(&g, [2, 2, 1]).unwrap();
    let config = IntegratorConfig {
        dt: 1.0e-4,
        cutoff: 0.1,
        constraints: vec![Constraint::ZeroComponent(Axis::Z)],
        filaments: vec![flagellum_spec(ORIGIN)],
        ..IntegratorConfig::default()
    };
    let fluid = FluidState::at_rest(&g);
    let engine = Integrator::new(config, g, d, PeriodicStokes::default(), PeriodicStokes::default())
        .unwrap();
    (engine, fluid)
}

fn by_sequence(engine: &Engine) -> Vec<Marker> {
    let mut markers: Vec<Marker> = engine.store().iter().cloned().collect();
    markers.sort_by_key(|m| m.sequence_index);
    markers
}

/// `2 k_s δ + 4 k_b e` for one geometry: δ the largest link strain, e
/// the largest bending residual at the step-start actuation.
fn force_bound(spec: &FilamentSpec, pos: &[Vec3]) -> f64 {
    let l0 = spec.rest_length();
    let delta = pos
        .windows(2)
        .map(|w| (w[1].distance(w[0]) - l0).abs())
        .fold(0.0, f64::max);
    let e = pos
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            let theta = target_angle(spec, 0.0, i as u32 + 1);
            let rot = bending_rotation(spec.bending_axis, theta);
            ((w[2] - w[1]) - rot * (w[1] - w[0])).length()
        })
        .fold(0.0, f64::max);
    2.0 * spec.spring_k * delta + 4.0 * spec.bending_k * e
}

#[test]
fn filament_spans_two_subdomains() {
    let (engine, _) = engine();
    let occupied = engine
        .store()
        .partitions()
        .iter()
        .filter(|p| !p.markers().is_empty())
        .count();
    assert_eq!(occupied, 2);
    assert_eq!(engine.decomposition().subdomain_count(), 4);
}

#[test]
fn one_step_keeps_plane_sequence_and_force_bound() {
    let (mut engine, mut fluid) = engine();
    let report = engine.step(&mut fluid).unwrap();
    assert!(report.converged(), "{report:?}");
    assert_eq!(report.step.0, 1);
    assert!((report.time - 1.0e-4).abs() < 1e-18);

    // (1) Out-of-plane coordinate untouched.
    for m in engine.store().iter() {
        assert_eq!(m.position.z, ORIGIN.z, "marker {} left the plane", m.id);
        assert_eq!(m.velocity.z, 0.0);
        assert_eq!(m.force.z, 0.0);
    }

    // (2) Sequence invariant and ownership.
    engine.store().check_sequences(engine.registry()).unwrap();
    engine
        .store()
        .verify_ownership(engine.decomposition(), Stage::Corrector)
        .unwrap();

    // (3) Interior force bound.
    let spec = flagellum_spec(ORIGIN);
    let markers = by_sequence(&engine);
    let pred: Vec<Vec3> = markers.iter().map(|m| m.pred_position).collect();
    let fin: Vec<Vec3> = markers.iter().map(|m| m.position).collect();
    let bound_pred = force_bound(&spec, &pred);
    let bound = bound_pred.max(force_bound(&spec, &fin)) * (1.0 + 1e-9);

    // Fluid at rest: the predictor geometry is the straight seed, so
    // only the prescribed curvature loads it.
    let l0 = spec.rest_length();
    assert!(bound_pred <= 4.0 * spec.bending_k * l0 * l0 * spec.actuation.amplitude * (1.0 + 1e-9));

    let interior = &markers[1..markers.len() - 1];
    for m in interior {
        let f = m.force.length();
        assert!(f.is_finite());
        assert!(f <= bound, "marker {}: |f| = {f} exceeds {bound}", m.id);
    }
    assert!(interior.iter().any(|m| m.force.length() > 0.0));
    assert!(markers.iter().any(|m| m.velocity.length() > 0.0), "fluid never moved the filament");
}

#[test]
fn fluid_momentum_stays_zero() {
    let (mut engine, mut fluid) = engine();
    for _ in 0..3 {
        engine.step(&mut fluid).unwrap();
    }
    let p = fluid.momentum(engine.config().density);
    assert!(p.length() < 1e-8, "net momentum {p:?}");
    assert!(fluid.velocity.max_abs() > 0.0);
    assert_eq!(fluid.velocity.data(Axis::Z).iter().map(|v| v.abs()).fold(0.0, f64::max), 0.0);
}

#[test]
fn metrics_describe_the_step() {
    let (mut engine, mut fluid) = engine();
    let report = engine.step(&mut fluid).unwrap();
    let m = &report.metrics;
    assert!(m.ghosts > 0, "filament crosses a block face");
    assert!(m.neighbor_pairs >= 14, "each link seen from both ends");
    assert_eq!(m.tie_breaks, 0);
    assert!(m.max_force > 0.0);
    assert_eq!(engine.last_metrics(), m);
}
