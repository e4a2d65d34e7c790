//! Filament and domain fixtures.

use strand_core::{DomainDecomposition, GridGeometry, Vec3};
use strand_markers::{Actuation, FilamentRegistry, FilamentSpec, MarkerStore};

/// Triply periodic unit cube with `n` cells per side.
pub fn unit_box(n: usize) -> GridGeometry {
    match GridGeometry::periodic_cube(n, 1.0) {
        Some(g) => g,
        None => panic!("unit_box({n}): need at least one cell"),
    }
}

/// The reference flagellum: 8 markers, `L = 0.5`, `k_s = k_b = 1e4`,
/// amplitude 10, `ω = 100`, straight along +x from `origin`, beating in
/// the xy-plane.
pub fn flagellum_spec(origin: Vec3) -> FilamentSpec {
    FilamentSpec {
        n_markers: 8,
        length: 0.5,
        spring_k: 1.0e4,
        bending_k: 1.0e4,
        actuation: Actuation {
            amplitude: 10.0,
            angular_frequency: 100.0,
            ..Actuation::default()
        },
        origin,
        direction: Vec3::X,
        bending_axis: Vec3::Z,
    }
}

/// Same geometry and stiffness as [`flagellum_spec`], without actuation.
pub fn passive_spec(origin: Vec3) -> FilamentSpec {
    FilamentSpec {
        actuation: Actuation::none(),
        ..flagellum_spec(origin)
    }
}

/// Seed every filament of `registry`, wrap into `geometry`, and
/// distribute over `decomp`.
pub fn seeded_store<D: DomainDecomposition>(
    registry: &FilamentRegistry,
    geometry: &GridGeometry,
    decomp: &D,
) -> MarkerStore {
    let markers = registry.seed_all().into_iter().map(|mut m| {
        m.position = geometry.wrap_position(m.position);
        m.pred_position = m.position;
        m
    });
    match MarkerStore::from_markers(markers, decomp) {
        Ok(s) => s,
        Err(e) => panic!("seeded_store: {e}"),
    }
}
