//! A filament straddling the periodic boundary stays connected through
//! ghost images, across decompositions.

use strand_core::{GridGeometry, Vec3};
use strand_grid::BlockDecomposition;
use strand_markers::{
    ChainPosition, ConnectivityResolver, FilamentRegistry, FilamentSpec, MarkerStore,
    NeighborIndex, Stage,
};

fn wrapped_registry(geometry: &GridGeometry) -> (FilamentRegistry, Vec<strand_markers::Marker>) {
    let reg = FilamentRegistry::from_specs([FilamentSpec {
        origin: Vec3::new(0.8, 0.95, 0.5),
        direction: Vec3::new(1.0, 0.5, 0.0),
        ..FilamentSpec::default()
    }])
    .unwrap();
    let mut markers = reg.seed_all();
    for m in &mut markers {
        m.position = geometry.wrap_position(m.position);
        m.pred_position = m.position;
    }
    (reg, markers)
}

#[test]
fn chain_resolves_across_periodic_wrap() {
    let g = GridGeometry::periodic_cube(16, 1.0).unwrap();
    for blocks in [[1, 1, 1], [2, 1, 1], [2, 2, 1], [2, 2, 2]] {
        let d = BlockDecomposition::new(&g, blocks).unwrap();
        let (reg, markers) = wrapped_registry(&g);
        let mut store = MarkerStore::from_markers(markers, &d).unwrap();
        store.check_sequences(&reg).unwrap();

        let cutoff = 0.1;
        store.exchange_ghosts(&d, cutoff, Stage::Corrector);
        let lists = NeighborIndex::new(cutoff).build_all(&store, Stage::Corrector);
        let resolver = ConnectivityResolver::new(&reg);

        let mut seen = 0;
        for (p, list) in store.partitions().iter().zip(&lists) {
            list.ensure_current(&store).unwrap();
            for (i, m) in p.markers().iter().enumerate() {
                let chain = resolver
                    .find_connected(p, i, list, Stage::Corrector)
                    .unwrap_or_else(|e| panic!("blocks {blocks:?}: {e}"));
                if let Some(next) = chain.next {
                    let q = p.view(next, Stage::Corrector).position;
                    // Ghost images make the link a plain short vector.
                    let l = m.position.distance(q);
                    assert!((l - 0.0625).abs() < 1e-9, "blocks {blocks:?}: link {l}");
                }
                if m.sequence_index == 0 {
                    assert_eq!(chain.position, ChainPosition::Start);
                }
                seen += 1;
            }
        }
        assert_eq!(seen, 8);
    }
}

#[test]
fn predictor_move_then_redistribute_keeps_invariant() {
    let g = GridGeometry::periodic_cube(16, 1.0).unwrap();
    let d = BlockDecomposition::new(&g, [2, 2, 1]).unwrap();
    let (reg, markers) = wrapped_registry(&g);
    let mut store = MarkerStore::from_markers(markers, &d).unwrap();

    for m in store.iter_mut() {
        m.reset_stage(Stage::Predictor);
        m.pred_position = g.wrap_position(m.position + Vec3::new(0.3, -0.2, 0.0));
    }
    let stats = store.redistribute(&d, Stage::Predictor).unwrap();
    assert_eq!(stats.owned, 8);
    store.verify_ownership(&d, Stage::Predictor).unwrap();
    store.check_sequences(&reg).unwrap();

    store.exchange_ghosts(&d, 0.1, Stage::Predictor);
    let lists = NeighborIndex::new(0.1).build_all(&store, Stage::Predictor);
    let resolver = ConnectivityResolver::new(&reg);
    for (p, list) in store.partitions().iter().zip(&lists) {
        for i in 0..p.markers().len() {
            resolver.find_connected(p, i, list, Stage::Predictor).unwrap();
        }
    }
}
