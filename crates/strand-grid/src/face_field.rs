//! Face-centred vector storage on a staggered grid.

use strand_core::{Axis, EulerianFieldStore, GridGeometry};

/// One value per face for each of the three velocity components.
///
/// Component `d` is stored on the faces normal to axis `d`, laid out
/// x-fastest. Halo accesses on periodic axes resolve to the aliased
/// interior face, so [`fill_boundary`](EulerianFieldStore::fill_boundary)
/// and [`sum_boundary`](EulerianFieldStore::sum_boundary) have nothing to
/// exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceField {
    geometry: GridGeometry,
    counts: [[usize; 3]; 3],
    data: [Vec<f64>; 3],
}

impl FaceField {
    /// Zero-initialised field on `geometry`.
    pub fn new(geometry: &GridGeometry) -> Self {
        let counts = [
            geometry.face_counts(Axis::X),
            geometry.face_counts(Axis::Y),
            geometry.face_counts(Axis::Z),
        ];
        let data = counts.map(|c| vec![0.0; c[0] * c[1] * c[2]]);
        Self {
            geometry: geometry.clone(),
            counts,
            data,
        }
    }

    /// Faces per axis for component `axis`.
    pub fn counts(&self, axis: Axis) -> [usize; 3] {
        self.counts[axis.index()]
    }

    /// Raw storage of component `axis`.
    pub fn data(&self, axis: Axis) -> &[f64] {
        &self.data[axis.index()]
    }

    /// Mutable raw storage of component `axis`.
    pub fn data_mut(&mut self, axis: Axis) -> &mut [f64] {
        &mut self.data[axis.index()]
    }

    /// Flat offset of face `index` in component `axis`, resolving halo
    /// indices. `None` outside a wall.
    pub fn offset(&self, axis: Axis, index: [i32; 3]) -> Option<usize> {
        let c = self.counts[axis.index()];
        let i = self.geometry.wrap_index(Axis::X, index[0], c[0])?;
        let j = self.geometry.wrap_index(Axis::Y, index[1], c[1])?;
        let k = self.geometry.wrap_index(Axis::Z, index[2], c[2])?;
        Some(i + c[0] * (j + c[1] * k))
    }

    /// Set every face of every component to `value`.
    pub fn fill(&mut self, value: f64) {
        for comp in &mut self.data {
            comp.fill(value);
        }
    }

    /// Overwrite with the contents of `other` (same geometry).
    pub fn copy_from(&mut self, other: &FaceField) {
        debug_assert_eq!(self.geometry, other.geometry);
        for (dst, src) in self.data.iter_mut().zip(&other.data) {
            dst.copy_from_slice(src);
        }
    }

    /// Multiply every value by `a`.
    pub fn scale(&mut self, a: f64) {
        for comp in &mut self.data {
            comp.iter_mut().for_each(|v| *v *= a);
        }
    }

    /// `self += a * other`.
    pub fn axpy(&mut self, a: f64, other: &FaceField) {
        debug_assert_eq!(self.geometry, other.geometry);
        for (dst, src) in self.data.iter_mut().zip(&other.data) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += a * s;
            }
        }
    }

    /// Plain sum of products over all faces.
    pub fn dot(&self, other: &FaceField) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>())
            .sum()
    }

    /// Discrete L2 inner product, `dot` weighted by the cell volume.
    ///
    /// This is the inner product under which interpolation and spreading
    /// are adjoint.
    pub fn weighted_dot(&self, other: &FaceField) -> f64 {
        self.dot(other) * self.geometry.cell_volume()
    }

    /// Euclidean norm over all faces.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Largest absolute face value.
    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f64, |m, v| m.max(v.abs()))
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.iter().all(|v| v.is_finite()))
    }
}

impl EulerianFieldStore for FaceField {
    fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    fn get(&self, axis: Axis, index: [i32; 3]) -> f64 {
        match self.offset(axis, index) {
            Some(o) => self.data[axis.index()][o],
            None => 0.0,
        }
    }

    fn set(&mut self, axis: Axis, index: [i32; 3], value: f64) {
        if let Some(o) = self.offset(axis, index) {
            self.data[axis.index()][o] = value;
        }
    }

    fn add(&mut self, axis: Axis, index: [i32; 3], value: f64) {
        if let Some(o) = self.offset(axis, index) {
            self.data[axis.index()][o] += value;
        }
    }

    /// No-penetration: normal velocity vanishes on wall faces.
    fn apply_physical_bc(&mut self) {
        for axis in Axis::ALL {
            if self.geometry.is_periodic(axis) {
                continue;
            }
            let d = axis.index();
            let c = self.counts[d];
            let last = c[d] - 1;
            for k in 0..c[2] {
                for j in 0..c[1] {
                    for i in 0..c[0] {
                        let idx = [i, j, k];
                        if idx[d] == 0 || idx[d] == last {
                            self.data[d][i + c[0] * (j + c[1] * k)] = 0.0;
                        }
                    }
                }
            }
        }
    }

    fn fill_boundary(&mut self, _halo_width: usize) {}

    fn sum_boundary(&mut self) {}
}
