//! Staggered field storage and block domain decomposition.
//!
//! These are in-process reference implementations of the collaborator
//! contracts declared in `strand-core`: a single store covers the whole
//! domain, so halo operations resolve through index wrapping rather than
//! message passing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell_field;
pub mod decomposition;
pub mod face_field;

pub use cell_field::CellField;
pub use decomposition::BlockDecomposition;
pub use face_field::FaceField;
