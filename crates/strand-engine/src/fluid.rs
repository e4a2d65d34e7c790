//! Fluid state owned by the caller and the step-local work buffers.

use strand_core::{Axis, EulerianFieldStore, GridGeometry, Vec3};
use strand_grid::{CellField, FaceField};

/// Committed Eulerian state: face velocities and cell pressure.
///
/// [`Integrator::step`](crate::Integrator::step) reads it at step start
/// and overwrites it only once both stages have succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidState {
    /// Staggered velocity.
    pub velocity: FaceField,
    /// Cell-centred pressure.
    pub pressure: CellField,
}

impl FluidState {
    /// Fluid at rest on `geometry`.
    pub fn at_rest(geometry: &GridGeometry) -> Self {
        Self {
            velocity: FaceField::new(geometry),
            pressure: CellField::new(geometry),
        }
    }

    /// Grid the state lives on.
    pub fn geometry(&self) -> &GridGeometry {
        self.velocity.geometry()
    }

    /// Total fluid momentum `ρ Σ u dV`, component by component.
    pub fn momentum(&self, density: f64) -> Vec3 {
        let dv = self.geometry().cell_volume();
        let mut out = Vec3::ZERO;
        for axis in Axis::ALL {
            let sum: f64 = self.velocity.data(axis).iter().sum();
            axis.set_component(&mut out, density * dv * sum);
        }
        out
    }
}

/// Externally supplied momentum-flux divergences added to the
/// right-hand side of each stage (stochastic forcing, body forces).
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalForcing {
    /// Added to the predictor right-hand side.
    pub predictor: FaceField,
    /// Added to the corrector right-hand side.
    pub corrector: FaceField,
}

impl ExternalForcing {
    /// The same uniform force density in both stages.
    pub fn uniform(geometry: &GridGeometry, force_density: Vec3) -> Self {
        let mut f = FaceField::new(geometry);
        for axis in Axis::ALL {
            f.data_mut(axis).fill(axis.component(force_density));
        }
        Self {
            predictor: f.clone(),
            corrector: f,
        }
    }

    /// Grid the forcing lives on.
    pub fn geometry(&self) -> &GridGeometry {
        self.predictor.geometry()
    }
}

/// Work buffers reused across steps.
#[derive(Debug)]
pub(crate) struct Scratch {
    pub rhs_velocity: FaceField,
    pub rhs_pressure: CellField,
    /// Output buffer for explicit operators.
    pub work: FaceField,
    /// `A(u^n)`, kept for the corrector.
    pub advection: FaceField,
    pub pred_velocity: FaceField,
    pub pred_pressure: CellField,
    pub velocity: FaceField,
    pub pressure: CellField,
}

impl Scratch {
    pub fn new(geometry: &GridGeometry) -> Self {
        let face = FaceField::new(geometry);
        let cell = CellField::new(geometry);
        Self {
            rhs_velocity: face.clone(),
            rhs_pressure: cell.clone(),
            work: face.clone(),
            advection: face.clone(),
            pred_velocity: face.clone(),
            pred_pressure: cell.clone(),
            velocity: face,
            pressure: cell,
        }
    }

    pub fn fits(&self, geometry: &GridGeometry) -> bool {
        self.work.geometry() == geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_of_uniform_flow() {
        let g = GridGeometry::periodic_cube(4, 2.0).unwrap();
        let mut s = FluidState::at_rest(&g);
        assert_eq!(s.momentum(1.0), Vec3::ZERO);
        s.velocity.data_mut(Axis::Y).fill(0.5);
        // 64 faces * 0.125 volume * 0.5
        let p = s.momentum(2.0);
        assert!((p.y - 8.0).abs() < 1e-12);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn uniform_forcing_fills_both_stages() {
        let g = GridGeometry::periodic_cube(2, 1.0).unwrap();
        let f = ExternalForcing::uniform(&g, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(f.predictor, f.corrector);
        assert_eq!(f.corrector.get(Axis::Z, [1, 1, 1]), -2.0);
        assert_eq!(f.corrector.get(Axis::Y, [0, 1, 0]), 0.0);
    }
}
