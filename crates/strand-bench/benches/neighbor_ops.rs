//! Criterion micro-benchmarks for redistribution, ghost exchange and
//! neighbour list construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strand_bench::stress_profile;
use strand_markers::{MarkerStore, NeighborIndex, Stage};
use strand_test_utils::seeded_store;

fn stress_store() -> (strand_bench::Profile, MarkerStore) {
    let p = stress_profile(42);
    let registry = p.config.registry().unwrap();
    let store = seeded_store(&registry, &p.geometry, &p.decomposition);
    (p, store)
}

fn bench_redistribute(c: &mut Criterion) {
    let (p, mut store) = stress_store();
    c.bench_function("redistribute_2048", |b| {
        b.iter(|| {
            let stats = store.redistribute(&p.decomposition, Stage::Corrector).unwrap();
            black_box(stats);
        });
    });
}

fn bench_exchange_ghosts(c: &mut Criterion) {
    let (p, mut store) = stress_store();
    let cutoff = p.config.cutoff;
    c.bench_function("exchange_ghosts_2048", |b| {
        b.iter(|| {
            let n = store.exchange_ghosts(&p.decomposition, cutoff, Stage::Corrector);
            black_box(n);
        });
    });
}

fn bench_build_neighbor_lists(c: &mut Criterion) {
    let (p, mut store) = stress_store();
    store.exchange_ghosts(&p.decomposition, p.config.cutoff, Stage::Corrector);
    let index = NeighborIndex::new(p.config.cutoff);
    c.bench_function("build_neighbor_lists_2048", |b| {
        b.iter(|| {
            let lists = index.build_all(&store, Stage::Corrector);
            black_box(&lists);
        });
    });
}

criterion_group!(
    benches,
    bench_redistribute,
    bench_exchange_ghosts,
    bench_build_neighbor_lists
);
criterion_main!(benches);
