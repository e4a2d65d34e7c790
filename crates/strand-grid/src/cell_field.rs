//! Cell-centred scalar storage.

use strand_core::{Axis, GridGeometry};

/// One value per cell, laid out x-fastest. Used for pressure and the
/// pressure right-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct CellField {
    geometry: GridGeometry,
    data: Vec<f64>,
}

impl CellField {
    /// Zero-initialised field on `geometry`.
    pub fn new(geometry: &GridGeometry) -> Self {
        Self {
            geometry: geometry.clone(),
            data: vec![0.0; geometry.cell_count()],
        }
    }

    /// Grid the field is defined on.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Raw storage.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw storage.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn offset(&self, index: [i32; 3]) -> Option<usize> {
        let n = self.geometry.n_cells();
        let i = self.geometry.wrap_index(Axis::X, index[0], n[0])?;
        let j = self.geometry.wrap_index(Axis::Y, index[1], n[1])?;
        let k = self.geometry.wrap_index(Axis::Z, index[2], n[2])?;
        Some(i + n[0] * (j + n[1] * k))
    }

    /// Value at cell `index`. Out-of-wall indices clamp to the nearest
    /// interior cell (zero normal gradient).
    pub fn get(&self, index: [i32; 3]) -> f64 {
        let n = self.geometry.n_cells();
        let clamped = [0, 1, 2].map(|d| {
            if self.geometry.periodic()[d] {
                index[d]
            } else {
                index[d].clamp(0, n[d] as i32 - 1)
            }
        });
        self.offset(clamped).map_or(0.0, |o| self.data[o])
    }

    /// Overwrite cell `index`; ignored outside a wall.
    pub fn set(&mut self, index: [i32; 3], value: f64) {
        if let Some(o) = self.offset(index) {
            self.data[o] = value;
        }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }
}
