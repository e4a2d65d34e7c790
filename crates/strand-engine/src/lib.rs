//! Time integration for the Strand immersed-boundary engine.
//!
//! Provides the [`Integrator`], which couples filament markers to a
//! staggered-grid fluid with a two-stage Heun predictor-corrector:
//! explicit marker motion and elastic forces, with the stiff viscous
//! update delegated to an implicit [`StokesSolver`](strand_core::StokesSolver).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod fluid;
pub mod integrator;
pub mod metrics;

pub use config::{ConfigError, IntegratorConfig};
pub use fluid::{ExternalForcing, FluidState};
pub use integrator::Integrator;
pub use metrics::{StepMetrics, StepReport};
