//! Filament force models for Strand.
//!
//! [`compute_forces`] is the entry point used by the integrator: it
//! resolves every owned marker's chain neighbours, accumulates spring and
//! bending contributions onto owned markers and ghost copies, reduces the
//! ghost contributions onto their owners, then applies the configured
//! [`Constraint`]s.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actuation;
pub mod bending;
pub mod constraint;
pub mod model;
pub mod pass;
pub mod spring;

pub use actuation::target_angle;
pub use bending::{bending_energy, bending_forces, bending_rotation, TripletForces};
pub use constraint::{apply_force_constraints, apply_velocity_constraints, Constraint};
pub use model::ForceModel;
pub use pass::{compute_forces, ForceStats};
pub use spring::{spring_energy, spring_force};
