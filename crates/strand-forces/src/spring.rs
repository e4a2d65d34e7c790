//! Hookean link springs.

use strand_core::Vec3;

/// Force on the marker at `a` from a spring to the marker at
/// `a + delta`: `k (r − l0) / r · delta`. The other end receives the
/// negation. Coincident markers exert no force.
#[inline]
pub fn spring_force(delta: Vec3, rest_length: f64, k: f64) -> Vec3 {
    let r = delta.length();
    if r == 0.0 {
        return Vec3::ZERO;
    }
    delta * (k * (r - rest_length) / r)
}

/// Stored energy `k/2 (r − l0)²`.
#[inline]
pub fn spring_energy(delta: Vec3, rest_length: f64, k: f64) -> f64 {
    let s = delta.length() - rest_length;
    0.5 * k * s * s
}
