//! Reference implicit viscous solve on a periodic staggered grid.

use strand_core::{
    Axis, EulerianFieldStore, FluidOperator, SolveOutcome, SolverError, StokesSolver, Vec3,
    ViscosityCoeffs,
};
use strand_grid::{CellField, FaceField};

/// Jacobi-iterated Helmholtz solve `(alpha − beta ∇²) u = rhs`, one face
/// component at a time, with the pressure held at zero.
///
/// Also supplies the explicit operators for right-hand side assembly:
/// the same 7-point viscous stencil, a staggered pressure gradient, and
/// zero advection (Stokes flow). The `gamma` (bulk) term is ignored.
#[derive(Clone, Debug)]
pub struct PeriodicStokes {
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl PeriodicStokes {
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

impl Default for PeriodicStokes {
    fn default() -> Self {
        Self::new(1e-10, 500)
    }
}

fn inv_dx2(field: &FaceField) -> Vec3 {
    let dx = field.geometry().dx();
    Vec3::ONE / (dx * dx)
}

/// `Σ_d (u[i + e_d] + u[i − e_d]) / dx_d²`
fn neighbour_sum(u: &FaceField, comp: Axis, [i, j, k]: [i32; 3], w: Vec3) -> f64 {
    w.x * (u.get(comp, [i + 1, j, k]) + u.get(comp, [i - 1, j, k]))
        + w.y * (u.get(comp, [i, j + 1, k]) + u.get(comp, [i, j - 1, k]))
        + w.z * (u.get(comp, [i, j, k + 1]) + u.get(comp, [i, j, k - 1]))
}

/// Visit every stored face, x-fastest, with its flat offset.
fn for_each_face([nx, ny, nz]: [usize; 3], mut f: impl FnMut(usize, [i32; 3])) {
    let mut flat = 0;
    for k in 0..nz as i32 {
        for j in 0..ny as i32 {
            for i in 0..nx as i32 {
                f(flat, [i, j, k]);
                flat += 1;
            }
        }
    }
}

impl StokesSolver for PeriodicStokes {
    type Velocity = FaceField;
    type Pressure = CellField;

    fn solve(
        &mut self,
        rhs_velocity: &FaceField,
        _rhs_pressure: &CellField,
        velocity: &mut FaceField,
        pressure: &mut CellField,
        coeffs: &ViscosityCoeffs,
    ) -> Result<SolveOutcome, SolverError> {
        if rhs_velocity.geometry() != velocity.geometry() {
            return Err(SolverError::GeometryMismatch {
                reason: "rhs and initial guess are on different grids".into(),
            });
        }
        let w = inv_dx2(velocity);
        let diag = coeffs.alpha + 2.0 * coeffs.beta * (w.x + w.y + w.z);
        let rhs_norm = rhs_velocity.norm();
        let target = self.tolerance * rhs_norm.max(f64::MIN_POSITIVE);

        let mut next = velocity.clone();
        let mut residual = f64::INFINITY;
        let mut iterations = 0;
        while iterations < self.max_iterations {
            let mut delta_sq = 0.0;
            let cur: &FaceField = velocity;
            for comp in Axis::ALL {
                let rhs = rhs_velocity.data(comp);
                let old = cur.data(comp);
                let out = next.data_mut(comp);
                for_each_face(cur.counts(comp), |flat, idx| {
                    let v = (rhs[flat] + coeffs.beta * neighbour_sum(cur, comp, idx, w)) / diag;
                    let d = v - old[flat];
                    delta_sq += d * d;
                    out[flat] = v;
                });
            }
            // rhs − A u = diag (u_next − u)
            residual = diag.abs() * delta_sq.sqrt();
            std::mem::swap(velocity, &mut next);
            iterations += 1;
            if !residual.is_finite() {
                return Err(SolverError::NonFinite {
                    residual_norm: residual,
                });
            }
            if residual <= target {
                break;
            }
        }
        velocity.apply_physical_bc();
        pressure.fill(0.0);

        let converged = residual <= target;
        log::trace!("periodic stokes: {iterations} iterations, residual {residual:e}");
        Ok(SolveOutcome {
            residual_norm: residual,
            converged,
            iterations,
        })
    }
}

impl FluidOperator for PeriodicStokes {
    type Velocity = FaceField;
    type Pressure = CellField;

    fn apply_viscous(&self, velocity: &FaceField, coeffs: &ViscosityCoeffs, out: &mut FaceField) {
        let w = inv_dx2(velocity);
        let centre = 2.0 * (w.x + w.y + w.z);
        for comp in Axis::ALL {
            let data = out.data_mut(comp);
            for_each_face(velocity.counts(comp), |flat, idx| {
                let u = velocity.data(comp)[flat];
                let lap = neighbour_sum(velocity, comp, idx, w) - centre * u;
                data[flat] = coeffs.alpha * u - coeffs.beta * lap;
            });
        }
    }

    fn advective_flux_divergence(&self, _velocity: &FaceField, out: &mut FaceField) {
        out.fill(0.0);
    }

    fn pressure_gradient(&self, pressure: &CellField, out: &mut FaceField) {
        let dx = pressure.geometry().dx();
        for comp in Axis::ALL {
            let h = comp.component(dx);
            let d = comp.index();
            let counts = out.counts(comp);
            let data = out.data_mut(comp);
            for_each_face(counts, |flat, idx| {
                let mut lower = idx;
                lower[d] -= 1;
                data[flat] = (pressure.get(idx) - pressure.get(lower)) / h;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::unit_box;
    use crate::random::random_face_field;

    fn coeffs() -> ViscosityCoeffs {
        ViscosityCoeffs {
            alpha: 1.0e3,
            beta: 0.5,
            gamma: 0.0,
        }
    }

    #[test]
    fn solve_inverts_apply_viscous() {
        let g = unit_box(8);
        let mut s = PeriodicStokes::default();
        let exact = random_face_field(&g, 7);
        let mut rhs = FaceField::new(&g);
        s.apply_viscous(&exact, &coeffs(), &mut rhs);

        let mut u = FaceField::new(&g);
        let mut p = CellField::new(&g);
        let out = s.solve(&rhs, &p.clone(), &mut u, &mut p, &coeffs()).unwrap();
        assert!(out.converged);
        let mut err = u.clone();
        err.axpy(-1.0, &exact);
        assert!(err.max_abs() < 1e-8, "max error {}", err.max_abs());
    }

    #[test]
    fn zero_rhs_converges_immediately() {
        let g = unit_box(4);
        let mut s = PeriodicStokes::default();
        let rhs = FaceField::new(&g);
        let mut u = FaceField::new(&g);
        let mut p = CellField::new(&g);
        let out = s.solve(&rhs, &p.clone(), &mut u, &mut p, &coeffs()).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
        assert_eq!(u.max_abs(), 0.0);
    }

    #[test]
    fn iteration_cap_reports_nonconvergence() {
        let g = unit_box(8);
        let mut s = PeriodicStokes::new(1e-14, 1);
        let rhs = random_face_field(&g, 3);
        let mut u = FaceField::new(&g);
        let mut p = CellField::new(&g);
        let c = ViscosityCoeffs {
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.0,
        };
        let out = s.solve(&rhs, &p.clone(), &mut u, &mut p, &c).unwrap();
        assert!(!out.converged);
        assert!(out.residual_norm > 0.0);
    }

    #[test]
    fn degenerate_operator_is_non_finite() {
        let g = unit_box(4);
        let mut s = PeriodicStokes::default();
        let rhs = random_face_field(&g, 1);
        let mut u = FaceField::new(&g);
        let mut p = CellField::new(&g);
        let c = ViscosityCoeffs {
            alpha: 0.0,
            beta: 0.0,
            gamma: 0.0,
        };
        match s.solve(&rhs, &p.clone(), &mut u, &mut p, &c) {
            Err(SolverError::NonFinite { .. }) => {}
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let mut s = PeriodicStokes::default();
        let rhs = FaceField::new(&unit_box(4));
        let mut u = FaceField::new(&unit_box(8));
        let mut p = CellField::new(&unit_box(8));
        match s.solve(&rhs, &p.clone(), &mut u, &mut p, &coeffs()) {
            Err(SolverError::GeometryMismatch { .. }) => {}
            other => panic!("expected GeometryMismatch, got {other:?}"),
        }
    }

    #[test]
    fn pressure_gradient_of_linear_ramp() {
        let g = unit_box(8);
        let s = PeriodicStokes::default();
        let mut p = CellField::new(&g);
        for k in 0..8 {
            for j in 0..8 {
                for i in 0..8 {
                    p.set([i, j, k], 0.5 * i as f64);
                }
            }
        }
        let mut grad = FaceField::new(&g);
        s.pressure_gradient(&p, &mut grad);
        // Interior x-faces see a slope of 0.5 per cell = 4 per unit length.
        assert!((grad.get(Axis::X, [3, 2, 2]) - 4.0).abs() < 1e-12);
        assert_eq!(grad.get(Axis::Y, [3, 2, 2]), 0.0);
    }
}
