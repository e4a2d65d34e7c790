//! Benchmark profiles for the Strand immersed-boundary engine.
//!
//! Provides pre-built [`Profile`]s for benchmarking and examples:
//!
//! - [`reference_profile`]: 32³ grid, 4 subdomains, 8 flagella of 16 markers
//! - [`stress_profile`]: 64³ grid, 16 subdomains, 64 flagella of 32 markers
//! - [`flagellum_bundle`]: deterministic filament placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strand_core::{Axis, GridGeometry, Vec3};
use strand_engine::IntegratorConfig;
use strand_forces::Constraint;
use strand_grid::BlockDecomposition;
use strand_markers::{Actuation, FilamentSpec};

/// Grid, decomposition and integrator configuration for one benchmark.
#[derive(Clone, Debug)]
pub struct Profile {
    /// Triply periodic unit box.
    pub geometry: GridGeometry,
    /// Equal-block decomposition of `geometry`.
    pub decomposition: BlockDecomposition,
    /// Integrator settings, filaments included.
    pub config: IntegratorConfig,
}

/// Build the reference profile: 32³ cells split `[2, 2, 1]`, eight
/// 16-marker flagella beating in the xy-plane.
pub fn reference_profile(seed: u64) -> Profile {
    profile(32, [2, 2, 1], flagellum_bundle(8, 16, seed))
}

/// Build the stress profile: 64³ cells split `[4, 4, 1]`, 64 flagella of
/// 32 markers.
///
/// Same physics as [`reference_profile`] at 8x the cells and 16x the
/// markers.
pub fn stress_profile(seed: u64) -> Profile {
    profile(64, [4, 4, 1], flagellum_bundle(64, 32, seed))
}

fn profile(n: usize, blocks: [usize; 3], filaments: Vec<FilamentSpec>) -> Profile {
    let geometry = match GridGeometry::periodic_cube(n, 1.0) {
        Some(g) => g,
        None => panic!("profile: {n} cells per side"),
    };
    let decomposition = match BlockDecomposition::new(&geometry, blocks) {
        Some(d) => d,
        None => panic!("profile: block layout {blocks:?}"),
    };
    let config = IntegratorConfig {
        dt: 1.0e-4,
        cutoff: 0.08,
        constraints: vec![Constraint::ZeroComponent(Axis::Z)],
        filaments,
        ..IntegratorConfig::default()
    };
    Profile {
        geometry,
        decomposition,
        config,
    }
}

/// `count` flagella of `n_markers` each, `L = 0.25`, stacked on an
/// evenly spaced lattice in the yz-plane.
///
/// Origins are staggered along x and phases drawn from a ChaCha stream
/// seeded with `seed`, so the same seed always yields the same bundle.
pub fn flagellum_bundle(count: usize, n_markers: u32, seed: u64) -> Vec<FilamentSpec> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let side = (count as f64).sqrt().ceil() as usize;
    let spacing = 1.0 / side as f64;
    (0..count)
        .map(|i| {
            let (row, layer) = (i % side, i / side);
            let origin = Vec3::new(
                rng.random_range(0.1..0.5),
                (row as f64 + 0.5) * spacing,
                (layer as f64 + 0.5) * spacing,
            );
            FilamentSpec {
                n_markers,
                length: 0.25,
                spring_k: 1.0e4,
                bending_k: 1.0e4,
                actuation: Actuation {
                    amplitude: 10.0,
                    angular_frequency: 100.0,
                    phase_offset: rng.random_range(0.0..std::f64::consts::TAU),
                    ..Actuation::default()
                },
                origin,
                direction: Vec3::X,
                bending_axis: Vec3::Z,
            }
        })
        .collect()
}
