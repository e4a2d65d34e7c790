//! Three-point bending kernel.
//!
//! For a triplet `(r_prev, r, r_next)` the deviation from the target
//! shape is `e = (r_next − r) − R (r − r_prev)`, where `R` rotates by the
//! target angle about the bending axis. The energy is `k_b/2 |e|²`; with
//! `R = I` a straight, evenly spaced triplet is force-free.

use glam::DMat3;
use strand_core::Vec3;

/// Forces on the three markers of a bending triplet. They sum to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripletForces {
    /// Force on the previous marker.
    pub prev: Vec3,
    /// Force on the centre marker.
    pub curr: Vec3,
    /// Force on the next marker.
    pub next: Vec3,
}

/// Rotation by `theta` about `axis` (normalised here).
pub fn bending_rotation(axis: Vec3, theta: f64) -> DMat3 {
    DMat3::from_axis_angle(axis.normalize(), theta)
}

#[inline]
fn deviation(r_prev: Vec3, r: Vec3, r_next: Vec3, rot: &DMat3) -> Vec3 {
    (r_next - r) - *rot * (r - r_prev)
}

/// Bending forces for one triplet with target rotation `rot`.
pub fn bending_forces(r_prev: Vec3, r: Vec3, r_next: Vec3, rot: &DMat3, k: f64) -> TripletForces {
    let e = deviation(r_prev, r, r_next, rot);
    let rt_e = rot.transpose() * e;
    TripletForces {
        prev: -k * rt_e,
        curr: k * (e + rt_e),
        next: -k * e,
    }
}

/// Stored energy `k/2 |e|²`.
pub fn bending_energy(r_prev: Vec3, r: Vec3, r_next: Vec3, rot: &DMat3, k: f64) -> f64 {
    0.5 * k * deviation(r_prev, r, r_next, rot).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn straight_triplet_is_force_free() {
        let l = Vec3::new(0.0625, 0.0, 0.0);
        let f = bending_forces(Vec3::ZERO, l, 2.0 * l, &DMat3::IDENTITY, 1.0e4);
        assert_eq!(f.prev, Vec3::ZERO);
        assert_eq!(f.curr, Vec3::ZERO);
        assert_eq!(f.next, Vec3::ZERO);
    }

    #[test]
    fn target_angle_bends_a_straight_triplet() {
        let l = Vec3::new(0.0625, 0.0, 0.0);
        let rot = bending_rotation(Vec3::Z, 0.1);
        let f = bending_forces(Vec3::ZERO, l, 2.0 * l, &rot, 1.0e4);
        // Positive rotation about z pushes the tip toward +y.
        assert!(f.next.y > 0.0);
        assert_eq!(f.next.z, 0.0);
        assert!((f.prev + f.curr + f.next).length() < 1e-9);
    }

    #[test]
    fn rotation_matches_its_shape() {
        let l = Vec3::new(0.0625, 0.0, 0.0);
        let rot = bending_rotation(Vec3::new(0.0, 0.0, 3.0), 0.3);
        let next = l + rot * l;
        let f = bending_forces(Vec3::ZERO, l, next, &rot, 1.0e4);
        assert!(f.curr.length() < 1e-9);
        assert!(bending_energy(Vec3::ZERO, l, next, &rot, 1.0e4) < 1e-20);
    }

    fn v() -> impl Strategy<Value = Vec3> {
        (-0.2f64..0.2, -0.2f64..0.2, -0.2f64..0.2).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn forces_are_negative_energy_gradient(
            a in v(), b in v(), c in v(), theta in -1.0f64..1.0,
        ) {
            let rot = bending_rotation(Vec3::new(0.3, -0.2, 1.0), theta);
            let k = 5.0;
            let h = 1e-6;
            let f = bending_forces(a, b, c, &rot, k);
            prop_assert!((f.prev + f.curr + f.next).length() < 1e-9);
            for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                let g = |da: Vec3, db: Vec3, dc: Vec3| bending_energy(a + da, b + db, c + dc, &rot, k);
                let hx = axis * h;
                let fd_prev = -(g(hx, Vec3::ZERO, Vec3::ZERO) - g(-hx, Vec3::ZERO, Vec3::ZERO)) / (2.0 * h);
                let fd_curr = -(g(Vec3::ZERO, hx, Vec3::ZERO) - g(Vec3::ZERO, -hx, Vec3::ZERO)) / (2.0 * h);
                let fd_next = -(g(Vec3::ZERO, Vec3::ZERO, hx) - g(Vec3::ZERO, Vec3::ZERO, -hx)) / (2.0 * h);
                prop_assert!((f.prev.dot(axis) - fd_prev).abs() < 1e-5);
                prop_assert!((f.curr.dot(axis) - fd_curr).abs() < 1e-5);
                prop_assert!((f.next.dot(axis) - fd_next).abs() < 1e-5);
            }
        }
    }
}
