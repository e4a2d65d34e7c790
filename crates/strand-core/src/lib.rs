//! Core types and traits for the Strand immersed-boundary engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Strand workspace:
//! typed IDs, grid geometry, error types, and the collaborator traits
//! that the marker/fluid coupling consumes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axis;
pub mod error;
pub mod geometry;
pub mod id;
pub mod traits;

pub use axis::Axis;
pub use error::{
    ConnectivityError, Link, MigrationError, SequenceError, SolverError, StepError,
};
pub use geometry::GridGeometry;
pub use id::{FilamentId, MarkerId, StepId, SubdomainId};
pub use traits::{
    DomainDecomposition, EulerianFieldStore, FluidOperator, GhostTarget, GhostTargets,
    SolveOutcome, StokesSolver, ViscosityCoeffs,
};

/// Three-component double-precision vector used for positions,
/// velocities and forces.
pub type Vec3 = glam::DVec3;
