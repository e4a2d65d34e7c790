//! Test utilities and reference collaborators for Strand development.
//!
//! Provides a Jacobi-iterated periodic Stokes solver ([`PeriodicStokes`])
//! that also serves as the explicit [`FluidOperator`](strand_core::FluidOperator),
//! a [`RecordingSolver`] mock, seeded random fields, and filament
//! fixtures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mock;
pub mod random;
pub mod stokes;

pub use fixtures::{flagellum_spec, passive_spec, seeded_store, unit_box};
pub use mock::{RecordingSolver, SolveCall};
pub use random::{random_face_field, random_vectors};
pub use stokes::PeriodicStokes;
