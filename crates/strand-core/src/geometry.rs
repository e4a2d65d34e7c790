//! Staggered-grid geometry shared by field stores, transfer operators
//! and decompositions.
//!
//! Cells are indexed `(i, j, k)` with cell `(0, 0, 0)` occupying
//! `[prob_lo, prob_lo + dx)`. Scalars live at cell centres; velocity
//! component `d` lives on the faces normal to axis `d`, so face
//! `(i, j, k)` of component `x` sits at `prob_lo + (i, j + ½, k + ½) * dx`.

use crate::{Axis, Vec3};

/// Uniform rectilinear grid over an axis-aligned box.
#[derive(Clone, Debug, PartialEq)]
pub struct GridGeometry {
    n_cells: [usize; 3],
    prob_lo: Vec3,
    prob_hi: Vec3,
    periodic: [bool; 3],
}

impl GridGeometry {
    /// Create a geometry, returning `None` if any extent is empty or the
    /// box is degenerate.
    pub fn new(n_cells: [usize; 3], prob_lo: Vec3, prob_hi: Vec3, periodic: [bool; 3]) -> Option<Self> {
        if n_cells.iter().any(|&n| n == 0) {
            return None;
        }
        let extent = prob_hi - prob_lo;
        if !extent.is_finite() || extent.min_element() <= 0.0 {
            return None;
        }
        Some(Self {
            n_cells,
            prob_lo,
            prob_hi,
            periodic,
        })
    }

    /// Cube `[0, length)^3` with `n` cells per side, periodic on all axes.
    pub fn periodic_cube(n: usize, length: f64) -> Option<Self> {
        Self::new([n; 3], Vec3::ZERO, Vec3::splat(length), [true; 3])
    }

    /// Cells per axis.
    pub fn n_cells(&self) -> [usize; 3] {
        self.n_cells
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.n_cells.iter().product()
    }

    /// Lower corner of the domain.
    pub fn prob_lo(&self) -> Vec3 {
        self.prob_lo
    }

    /// Upper corner of the domain.
    pub fn prob_hi(&self) -> Vec3 {
        self.prob_hi
    }

    /// Domain extent per axis.
    pub fn extent(&self) -> Vec3 {
        self.prob_hi - self.prob_lo
    }

    /// Periodicity flags per axis.
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Whether `axis` wraps around.
    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// Cell size per axis.
    pub fn dx(&self) -> Vec3 {
        let n = Vec3::new(
            self.n_cells[0] as f64,
            self.n_cells[1] as f64,
            self.n_cells[2] as f64,
        );
        self.extent() / n
    }

    /// Volume of one cell.
    pub fn cell_volume(&self) -> f64 {
        let dx = self.dx();
        dx.x * dx.y * dx.z
    }

    /// Number of faces carrying velocity component `axis` along each axis.
    ///
    /// A periodic axis has as many faces as cells (the last face aliases
    /// the first); a walled axis has one extra face in its own direction.
    pub fn face_counts(&self, axis: Axis) -> [usize; 3] {
        let mut counts = self.n_cells;
        let d = axis.index();
        if !self.periodic[d] {
            counts[d] += 1;
        }
        counts
    }

    /// Physical location of face `index` of component `axis`.
    pub fn face_position(&self, axis: Axis, index: [i32; 3]) -> Vec3 {
        let offset = Self::face_offset(axis);
        let dx = self.dx();
        Vec3::new(
            self.prob_lo.x + (index[0] as f64 + offset.x) * dx.x,
            self.prob_lo.y + (index[1] as f64 + offset.y) * dx.y,
            self.prob_lo.z + (index[2] as f64 + offset.z) * dx.z,
        )
    }

    /// Offset, in cell units, of component `axis`'s faces from the cell
    /// corner: ½ along the two tangential axes, 0 along the normal.
    pub fn face_offset(axis: Axis) -> Vec3 {
        let mut offset = Vec3::splat(0.5);
        axis.set_component(&mut offset, 0.0);
        offset
    }

    /// Centre of cell `index`.
    pub fn cell_center(&self, index: [i32; 3]) -> Vec3 {
        let dx = self.dx();
        self.prob_lo
            + Vec3::new(
                (index[0] as f64 + 0.5) * dx.x,
                (index[1] as f64 + 0.5) * dx.y,
                (index[2] as f64 + 0.5) * dx.z,
            )
    }

    /// Fold `position` back into the domain along periodic axes.
    ///
    /// Positions already inside the domain are returned bit-for-bit
    /// unchanged. Walled axes are left alone.
    pub fn wrap_position(&self, position: Vec3) -> Vec3 {
        let mut p = position;
        let extent = self.extent();
        for axis in Axis::ALL {
            let d = axis.index();
            if !self.periodic[d] {
                continue;
            }
            let lo = self.prob_lo[d];
            let hi = self.prob_hi[d];
            if p[d] < lo || p[d] >= hi {
                let wrapped = lo + (p[d] - lo).rem_euclid(extent[d]);
                // rem_euclid can round up to exactly `extent` for tiny negatives.
                p[d] = if wrapped >= hi { lo } else { wrapped };
            }
        }
        p
    }

    /// Whether `position` lies inside the half-open domain box.
    pub fn contains(&self, position: Vec3) -> bool {
        Axis::ALL.iter().all(|a| {
            let d = a.index();
            position[d] >= self.prob_lo[d] && position[d] < self.prob_hi[d]
        })
    }

    /// Map an arbitrary index along `axis` onto stored storage for a field
    /// with `count` entries along that axis. Returns `None` when the index
    /// falls outside a walled axis.
    #[inline]
    pub fn wrap_index(&self, axis: Axis, index: i32, count: usize) -> Option<usize> {
        if self.periodic[axis.index()] {
            Some(index.rem_euclid(count as i32) as usize)
        } else if index >= 0 && (index as usize) < count {
            Some(index as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_degenerate_boxes() {
        assert!(GridGeometry::new([0, 4, 4], Vec3::ZERO, Vec3::ONE, [true; 3]).is_none());
        assert!(GridGeometry::new([4, 4, 4], Vec3::ONE, Vec3::ONE, [true; 3]).is_none());
        assert!(GridGeometry::periodic_cube(8, 1.0).is_some());
    }

    #[test]
    fn face_positions_are_staggered() {
        let g = GridGeometry::periodic_cube(4, 1.0).unwrap();
        let p = g.face_position(Axis::X, [1, 0, 0]);
        assert_eq!(p, Vec3::new(0.25, 0.125, 0.125));
        let p = g.face_position(Axis::Z, [0, 0, 2]);
        assert_eq!(p, Vec3::new(0.125, 0.125, 0.5));
    }

    #[test]
    fn walled_axis_has_extra_face() {
        let g = GridGeometry::new([4, 4, 4], Vec3::ZERO, Vec3::ONE, [true, false, true]).unwrap();
        assert_eq!(g.face_counts(Axis::Y), [4, 5, 4]);
        assert_eq!(g.face_counts(Axis::X), [4, 4, 4]);
        assert_eq!(g.wrap_index(Axis::Y, 5, 5), None);
        assert_eq!(g.wrap_index(Axis::X, -1, 4), Some(3));
    }

    #[test]
    fn wrap_leaves_interior_points_untouched() {
        let g = GridGeometry::periodic_cube(8, 1.0).unwrap();
        let p = Vec3::new(0.1, 0.5, 0.999);
        assert_eq!(g.wrap_position(p), p);
        let w = g.wrap_position(Vec3::new(-0.25, 1.25, 0.5));
        assert!((w - Vec3::new(0.75, 0.25, 0.5)).length() < 1e-12);
    }

    proptest! {
        #[test]
        fn wrapped_positions_are_inside(x in -5.0f64..5.0, y in -5.0f64..5.0, z in -5.0f64..5.0) {
            let g = GridGeometry::periodic_cube(8, 2.0).unwrap();
            let w = g.wrap_position(Vec3::new(x, y, z));
            prop_assert!(g.contains(w), "{w:?} escaped the domain");
        }
    }
}
