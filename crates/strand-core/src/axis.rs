//! Cartesian axis selector.

use std::fmt;

use crate::Vec3;

/// One of the three Cartesian axes.
///
/// Staggered velocity components are addressed by the axis normal to
/// the face they live on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in component order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1, 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Read this axis' component of `v`.
    #[inline]
    pub fn component(self, v: Vec3) -> f64 {
        v[self.index()]
    }

    /// Overwrite this axis' component of `v`.
    #[inline]
    pub fn set_component(self, v: &mut Vec3, value: f64) {
        v[self.index()] = value;
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_component_order() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
            assert_eq!(axis.component(axis.unit()), 1.0);
        }
    }

    #[test]
    fn set_component_touches_only_that_axis() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        Axis::Z.set_component(&mut v, 0.0);
        assert_eq!(v, Vec3::new(1.0, 2.0, 0.0));
    }
}
