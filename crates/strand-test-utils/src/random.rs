//! Seeded random data.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strand_core::{GridGeometry, Vec3};
use strand_grid::FaceField;

/// Face field with every value uniform in `[-1, 1)`.
pub fn random_face_field(geometry: &GridGeometry, seed: u64) -> FaceField {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut f = FaceField::new(geometry);
    for axis in strand_core::Axis::ALL {
        for v in f.data_mut(axis) {
            *v = rng.random_range(-1.0..1.0);
        }
    }
    f
}

/// `n` vectors with components uniform in `[-1, 1)`.
pub fn random_vectors(n: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
        })
        .collect()
}
