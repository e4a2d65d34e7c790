//! Criterion micro-benchmarks for the force pass and marker/grid transfer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strand_bench::reference_profile;
use strand_coupling::{interpolate_markers, spread_markers, DeltaKernel};
use strand_forces::{compute_forces, ForceModel};
use strand_grid::FaceField;
use strand_markers::{NeighborIndex, Stage};
use strand_test_utils::{random_face_field, seeded_store};

fn bench_compute_forces(c: &mut Criterion) {
    let p = reference_profile(42);
    let registry = p.config.registry().unwrap();
    let mut store = seeded_store(&registry, &p.geometry, &p.decomposition);
    store.exchange_ghosts(&p.decomposition, p.config.cutoff, Stage::Corrector);
    let lists = NeighborIndex::new(p.config.cutoff).build_all(&store, Stage::Corrector);

    c.bench_function("compute_forces_128", |b| {
        b.iter(|| {
            let stats = compute_forces(
                &mut store,
                &lists,
                &registry,
                ForceModel::SpringBending,
                &p.config.constraints,
                Stage::Corrector,
                0.01,
            )
            .unwrap();
            black_box(stats);
        });
    });
}

fn bench_transfer(c: &mut Criterion) {
    let p = reference_profile(42);
    let registry = p.config.registry().unwrap();
    let mut store = seeded_store(&registry, &p.geometry, &p.decomposition);
    let velocity = random_face_field(&p.geometry, 7);
    let mut forcing = FaceField::new(&p.geometry);

    for kernel in [DeltaKernel::Linear, DeltaKernel::Peskin4] {
        c.bench_function(&format!("interpolate_128_{kernel:?}"), |b| {
            b.iter(|| {
                interpolate_markers(&velocity, kernel, &mut store, Stage::Corrector);
                black_box(&store);
            });
        });
        c.bench_function(&format!("spread_128_{kernel:?}"), |b| {
            b.iter(|| {
                forcing.fill(0.0);
                spread_markers(&mut forcing, kernel, &store, Stage::Corrector);
                black_box(&forcing);
            });
        });
    }
}

criterion_group!(benches, bench_compute_forces, bench_transfer);
criterion_main!(benches);
