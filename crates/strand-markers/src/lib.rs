//! Distributed Lagrangian marker storage for Strand.
//!
//! Markers are owned by exactly one subdomain of a
//! [`DomainDecomposition`](strand_core::DomainDecomposition). Chain
//! linkage is never stored as a reference: each marker carries
//! `(filament, sequence_index)` and its neighbours along the filament
//! are recovered every step from a proximity [`NeighborList`] by the
//! [`ConnectivityResolver`].
//!
//! # Step protocol
//!
//! 1. [`MarkerStore::redistribute`] re-homes moved markers
//! 2. [`MarkerStore::exchange_ghosts`] refreshes read-only ghost copies
//! 3. [`NeighborIndex::build_all`] bins owned and ghost markers
//! 4. forces are accumulated onto owned and ghost slots
//! 5. [`MarkerStore::sum_neighbors`] folds ghost contributions back

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod connectivity;
pub mod filament;
pub mod marker;
pub mod neighbor;
pub mod store;

pub use connectivity::{Chain, ChainPosition, ConnectivityResolver};
pub use filament::{Actuation, FilamentError, FilamentRegistry, FilamentSpec};
pub use marker::{Marker, Stage};
pub use neighbor::{NeighborIndex, NeighborList, NeighborRef};
pub use store::{GhostMarker, MarkerKey, MarkerStore, MarkerView, Partition, RedistributeStats};
