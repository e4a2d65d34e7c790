//! Contracts the marker engine consumes from external collaborators.
//!
//! The Eulerian field storage, the implicit viscous solve and the spatial
//! domain decomposition are owned elsewhere; the engine only relies on
//! the operations declared here.

use smallvec::SmallVec;

use crate::error::SolverError;
use crate::{Axis, GridGeometry, SubdomainId, Vec3};

/// Staggered velocity-like storage addressed by face index.
///
/// Indices may fall outside the locally stored range by up to the halo
/// width; the store resolves them through its halo (periodic images or
/// neighbouring subdomains). Reads outside a physical wall return zero and
/// writes there are discarded, so [`get`](Self::get) and
/// [`add`](Self::add) stay adjoint.
pub trait EulerianFieldStore {
    /// Grid the field is defined on.
    fn geometry(&self) -> &GridGeometry;

    /// Read component `axis` at face `index`.
    fn get(&self, axis: Axis, index: [i32; 3]) -> f64;

    /// Overwrite component `axis` at face `index`.
    fn set(&mut self, axis: Axis, index: [i32; 3], value: f64);

    /// Accumulate into component `axis` at face `index`.
    fn add(&mut self, axis: Axis, index: [i32; 3], value: f64) {
        let v = self.get(axis, index);
        self.set(axis, index, v + value);
    }

    /// Re-impose physical boundary conditions on wall faces.
    fn apply_physical_bc(&mut self);

    /// Refresh halo cells from their owners, `halo_width` cells deep.
    fn fill_boundary(&mut self, halo_width: usize);

    /// Fold contributions written into halo cells back onto their owners
    /// (additive reduction).
    fn sum_boundary(&mut self);
}

/// Coefficients of the staggered viscous operator
/// `alpha * u - div(beta * grad u) - grad(gamma * div u)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViscosityCoeffs {
    /// Mass (time-derivative) coefficient, typically `rho / dt`.
    pub alpha: f64,
    /// Shear viscosity.
    pub beta: f64,
    /// Bulk viscosity.
    pub gamma: f64,
}

impl ViscosityCoeffs {
    /// Implicit half of a Crank–Nicolson split: `alpha`, `beta/2`, `gamma/2`.
    pub fn implicit_half(&self) -> Self {
        Self {
            alpha: self.alpha,
            beta: 0.5 * self.beta,
            gamma: 0.5 * self.gamma,
        }
    }

    /// Explicit half of a Crank–Nicolson split, with no mass term:
    /// applying it yields `+½ div(beta grad u) + ½ grad(gamma div u)`.
    pub fn explicit_half(&self) -> Self {
        Self {
            alpha: 0.0,
            beta: -0.5 * self.beta,
            gamma: -0.5 * self.gamma,
        }
    }
}

impl Default for ViscosityCoeffs {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: 1.0,
            gamma: 0.0,
        }
    }
}

/// Result of one implicit viscous solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveOutcome {
    /// Norm of the final residual.
    pub residual_norm: f64,
    /// Whether the solver met its own tolerance.
    pub converged: bool,
    /// Iterations taken.
    pub iterations: u32,
}

/// The implicit viscous/pressure solve.
///
/// An opaque collaborator: the engine depends only on this signature.
/// `velocity` and `pressure` carry the initial guess in and the solution
/// out.
pub trait StokesSolver {
    /// Face-centred velocity storage.
    type Velocity;
    /// Cell-centred pressure storage.
    type Pressure;

    /// Solve for velocity and pressure.
    fn solve(
        &mut self,
        rhs_velocity: &Self::Velocity,
        rhs_pressure: &Self::Pressure,
        velocity: &mut Self::Velocity,
        pressure: &mut Self::Pressure,
        coeffs: &ViscosityCoeffs,
    ) -> Result<SolveOutcome, SolverError>;
}

/// Explicit fluid operators used to assemble the solver right-hand side.
pub trait FluidOperator {
    /// Face-centred velocity storage.
    type Velocity;
    /// Cell-centred pressure storage.
    type Pressure;

    /// Apply the viscous operator with `coeffs` to `velocity`, writing `out`.
    fn apply_viscous(&self, velocity: &Self::Velocity, coeffs: &ViscosityCoeffs, out: &mut Self::Velocity);

    /// Advective momentum flux divergence `-div(u u)`, writing `out`.
    fn advective_flux_divergence(&self, velocity: &Self::Velocity, out: &mut Self::Velocity);

    /// Pressure gradient on faces, writing `out`.
    fn pressure_gradient(&self, pressure: &Self::Pressure, out: &mut Self::Velocity);
}

/// A subdomain that must hold a ghost copy of a marker, and the periodic
/// shift to apply to the copy's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostTarget {
    /// Receiving subdomain.
    pub subdomain: SubdomainId,
    /// Offset added to the marker position (a multiple of the domain
    /// extent along periodic axes, zero otherwise).
    pub shift: Vec3,
}

/// Ghost targets for one marker; most markers have none or a few.
pub type GhostTargets = SmallVec<[GhostTarget; 8]>;

/// Spatial partition of the domain into owning subdomains.
///
/// Supplies the geometric queries behind particle redistribution and the
/// ghost exchange.
pub trait DomainDecomposition {
    /// Number of subdomains.
    fn subdomain_count(&self) -> usize;

    /// Subdomain whose region contains `position`, or `None` if the point
    /// is outside the domain.
    fn owner_of(&self, position: Vec3) -> Option<SubdomainId>;

    /// Every subdomain (with periodic shift) whose region grown by `cutoff`
    /// contains `position`, excluding the owner's unshifted self.
    fn ghost_targets(&self, position: Vec3, cutoff: f64) -> GhostTargets;

    /// Largest cutoff a single ghost layer can serve.
    fn max_ghost_cutoff(&self) -> f64;
}
