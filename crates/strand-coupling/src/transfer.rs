//! Interpolation (grid to marker) and spreading (marker to grid).

use strand_core::{Axis, EulerianFieldStore, GridGeometry, Vec3};
use strand_markers::{MarkerStore, Stage};

use crate::kernel::{DeltaKernel, Stencil};

/// Per-axis stencils of velocity component `comp` around `x`.
fn stencils(geometry: &GridGeometry, kernel: DeltaKernel, comp: Axis, x: Vec3) -> [Stencil; 3] {
    let s = (x - geometry.prob_lo()) / geometry.dx() - GridGeometry::face_offset(comp);
    [kernel.stencil(s.x), kernel.stencil(s.y), kernel.stencil(s.z)]
}

/// Sample the staggered field at `x`.
///
/// Reads up to `kernel.halo_width()` cells outside the local range; the
/// caller refreshes the halo first.
pub fn interpolate<F: EulerianFieldStore>(field: &F, kernel: DeltaKernel, x: Vec3) -> Vec3 {
    let mut u = Vec3::ZERO;
    for comp in Axis::ALL {
        let [sx, sy, sz] = stencils(field.geometry(), kernel, comp, x);
        let mut acc = 0.0;
        for (k, wz) in sz.iter() {
            for (j, wy) in sy.iter() {
                let wyz = wy * wz;
                for (i, wx) in sx.iter() {
                    acc += wx * wyz * field.get(comp, [i, j, k]);
                }
            }
        }
        comp.set_component(&mut u, acc);
    }
    u
}

/// Add the force density of a point force `force` at `x` into `field`.
///
/// Exactly the transpose of [`interpolate`] divided by the cell volume.
/// Writes may land in halo cells; the caller reduces them with
/// [`sum_boundary`](EulerianFieldStore::sum_boundary).
pub fn spread<F: EulerianFieldStore>(field: &mut F, kernel: DeltaKernel, x: Vec3, force: Vec3) {
    let inv_volume = 1.0 / field.geometry().cell_volume();
    for comp in Axis::ALL {
        let fc = comp.component(force);
        if fc == 0.0 {
            continue;
        }
        let [sx, sy, sz] = stencils(field.geometry(), kernel, comp, x);
        let scaled = fc * inv_volume;
        for (k, wz) in sz.iter() {
            for (j, wy) in sy.iter() {
                let wyz = wy * wz * scaled;
                for (i, wx) in sx.iter() {
                    field.add(comp, [i, j, k], wx * wyz);
                }
            }
        }
    }
}

/// Interpolate `field` at every owned marker's `stage` position into its
/// `stage` velocity.
pub fn interpolate_markers<F: EulerianFieldStore>(
    field: &F,
    kernel: DeltaKernel,
    store: &mut MarkerStore,
    stage: Stage,
) {
    for m in store.iter_mut() {
        let u = interpolate(field, kernel, m.stage_position(stage));
        *m.stage_velocity_mut(stage) = u;
    }
}

/// Spread every owned marker's `stage` force, at its `stage` position,
/// into `field`, then fold halo contributions onto their owners and
/// re-impose boundary conditions.
///
/// Accumulates: the caller clears `field` first if it should hold only
/// marker forcing.
pub fn spread_markers<F: EulerianFieldStore>(
    field: &mut F,
    kernel: DeltaKernel,
    store: &MarkerStore,
    stage: Stage,
) {
    for m in store.iter() {
        spread(field, kernel, m.stage_position(stage), m.stage_force(stage));
    }
    field.sum_boundary();
    field.apply_physical_bc();
}
