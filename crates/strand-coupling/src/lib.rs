//! Immersed-boundary transfer operators.
//!
//! [`interpolate`] samples a staggered velocity field at a point with a
//! tensor-product [`DeltaKernel`]; [`spread`] writes a point force into a
//! force-density field with the same weights divided by the cell volume.
//! The marker-level wrappers [`interpolate_markers`] and
//! [`spread_markers`] loop over a [`MarkerStore`](strand_markers::MarkerStore).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod kernel;
pub mod transfer;

pub use kernel::DeltaKernel;
pub use transfer::{interpolate, interpolate_markers, spread, spread_markers};
