//! One-dimensional smoothing kernels, applied as tensor products.

use std::fmt;

/// Regularised delta function used for marker/grid transfer.
///
/// Arguments to [`weight`](Self::weight) are in grid units. Every variant
/// is a partition of unity: the weights of a point over all grid nodes
/// sum to one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaKernel {
    /// Hat function, 2 points.
    Linear,
    /// Roma–Peskin 3-point kernel.
    Peskin3,
    /// Peskin 4-point cosine-free kernel.
    #[default]
    Peskin4,
    /// Quadratic B-spline, 3 points.
    QuadraticBSpline,
}

/// Most nodes any kernel touches along one axis.
pub const MAX_STENCIL: usize = 5;

impl DeltaKernel {
    /// Half-width of the support in grid units.
    pub fn support(self) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::Peskin3 | Self::QuadraticBSpline => 1.5,
            Self::Peskin4 => 2.0,
        }
    }

    /// Halo depth, in cells, a field needs for transfer with this kernel.
    pub fn halo_width(self) -> usize {
        self.support().ceil() as usize
    }

    /// Weight at signed distance `r` grid units from a node.
    #[inline]
    pub fn weight(self, r: f64) -> f64 {
        let a = r.abs();
        match self {
            Self::Linear => (1.0 - a).max(0.0),
            Self::Peskin3 => {
                if a <= 0.5 {
                    (1.0 + (1.0 - 3.0 * a * a).max(0.0).sqrt()) / 3.0
                } else if a < 1.5 {
                    let b = 1.0 - a;
                    (5.0 - 3.0 * a - (1.0 - 3.0 * b * b).max(0.0).sqrt()) / 6.0
                } else {
                    0.0
                }
            }
            Self::Peskin4 => {
                if a < 1.0 {
                    (3.0 - 2.0 * a + (1.0 + 4.0 * a - 4.0 * a * a).max(0.0).sqrt()) / 8.0
                } else if a < 2.0 {
                    (5.0 - 2.0 * a - (-7.0 + 12.0 * a - 4.0 * a * a).max(0.0).sqrt()) / 8.0
                } else {
                    0.0
                }
            }
            Self::QuadraticBSpline => {
                if a < 0.5 {
                    0.75 - a * a
                } else if a < 1.5 {
                    let t = 1.5 - a;
                    0.5 * t * t
                } else {
                    0.0
                }
            }
        }
    }

    /// Nodes and weights along one axis for a point at `s` grid units.
    pub(crate) fn stencil(self, s: f64) -> Stencil {
        let h = self.support();
        let start = (s - h).ceil() as i32;
        let end = (s + h).floor() as i32;
        let len = ((end - start + 1).max(0) as usize).min(MAX_STENCIL);
        let mut weights = [0.0; MAX_STENCIL];
        for (k, w) in weights.iter_mut().enumerate().take(len) {
            *w = self.weight(s - (start + k as i32) as f64);
        }
        Stencil {
            start,
            len,
            weights,
        }
    }
}

impl fmt::Display for DeltaKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Peskin3 => f.write_str("peskin3"),
            Self::Peskin4 => f.write_str("peskin4"),
            Self::QuadraticBSpline => f.write_str("bspline2"),
        }
    }
}

/// Contiguous run of nodes `start..start + len` with their weights.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stencil {
    pub(crate) start: i32,
    pub(crate) len: usize,
    pub(crate) weights: [f64; MAX_STENCIL],
}

impl Stencil {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.weights[..self.len]
            .iter()
            .enumerate()
            .map(|(k, &w)| (self.start + k as i32, w))
    }
}
