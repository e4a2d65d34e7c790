//! Error types for the Strand engine.
//!
//! Organised by subsystem: connectivity (chain lookup), migration
//! (ownership transfer), sequence (filament index invariant) and solver
//! (viscous solve contract). [`StepError`] is the umbrella returned by a
//! time step; any variant other than a non-converged solve is fatal and
//! must stop every subdomain.

use std::error::Error;
use std::fmt;

use crate::{FilamentId, MarkerId, SubdomainId};

/// Which chain link a connectivity lookup failed to find.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
    /// The marker at `sequence_index - 1`.
    Prev,
    /// The marker at `sequence_index + 1`.
    Next,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prev => f.write_str("previous"),
            Self::Next => f.write_str("next"),
        }
    }
}

/// An expected chain neighbour was not present in the neighbour list.
///
/// Signals a lost or mis-migrated marker, or a link stretched beyond the
/// neighbour cutoff. Never recoverable locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectivityError {
    /// The previous or next marker along the filament is missing.
    Broken {
        /// Marker whose neighbour is missing.
        marker: MarkerId,
        /// Filament the marker belongs to.
        filament: FilamentId,
        /// Position of the marker along its filament.
        sequence_index: u32,
        /// Which side of the chain is missing.
        missing: Link,
    },
    /// The marker names a filament absent from the registry.
    UnknownFilament {
        /// Marker carrying the unknown filament id.
        marker: MarkerId,
        /// The unknown filament.
        filament: FilamentId,
    },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broken {
                marker,
                filament,
                sequence_index,
                missing,
            } => write!(
                f,
                "marker {marker} (filament {filament}, index {sequence_index}) \
                 has no {missing} neighbour"
            ),
            Self::UnknownFilament { marker, filament } => {
                write!(f, "marker {marker} references unknown filament {filament}")
            }
        }
    }
}

impl Error for ConnectivityError {}

/// Ownership and position disagree after a redistribution.
#[derive(Clone, Debug, PartialEq)]
pub enum MigrationError {
    /// The total marker count changed across the transfer.
    MarkerLost {
        /// Markers owned before redistribution.
        before: usize,
        /// Markers owned after redistribution.
        after: usize,
    },
    /// The same marker id is owned by more than one subdomain (or twice by one).
    MarkerDuplicated {
        /// The duplicated marker.
        marker: MarkerId,
    },
    /// A marker's position lies outside every subdomain.
    OutsideDomain {
        /// The stray marker.
        marker: MarkerId,
        /// Its position.
        position: [f64; 3],
    },
    /// A marker is owned by a subdomain that does not contain it.
    WrongOwner {
        /// The misplaced marker.
        marker: MarkerId,
        /// Subdomain holding it.
        owner: SubdomainId,
        /// Subdomain containing its position.
        expected: SubdomainId,
    },
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkerLost { before, after } => {
                write!(f, "marker count changed during redistribution: {before} -> {after}")
            }
            Self::MarkerDuplicated { marker } => {
                write!(f, "marker {marker} is owned more than once")
            }
            Self::OutsideDomain { marker, position } => {
                write!(f, "marker {marker} at {position:?} lies outside the domain")
            }
            Self::WrongOwner {
                marker,
                owner,
                expected,
            } => write!(
                f,
                "marker {marker} owned by subdomain {owner} but located in {expected}"
            ),
        }
    }
}

impl Error for MigrationError {}

/// A filament's sequence indices are not exactly `{0, …, N−1}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// An index in `0..N` is held by no marker.
    Gap {
        /// The filament.
        filament: FilamentId,
        /// The missing index.
        sequence_index: u32,
    },
    /// An index is held by more than one marker, or lies outside `0..N`.
    Duplicate {
        /// The filament.
        filament: FilamentId,
        /// The offending index.
        sequence_index: u32,
    },
    /// A marker names a filament absent from the registry.
    UnknownFilament {
        /// The unknown filament.
        filament: FilamentId,
    },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap {
                filament,
                sequence_index,
            } => write!(f, "filament {filament} has no marker at index {sequence_index}"),
            Self::Duplicate {
                filament,
                sequence_index,
            } => write!(
                f,
                "filament {filament} index {sequence_index} is duplicated or out of range"
            ),
            Self::UnknownFilament { filament } => write!(f, "unknown filament {filament}"),
        }
    }
}

impl Error for SequenceError {}

/// Hard failures of the viscous solve contract.
///
/// Non-convergence is not an error; it is reported through
/// [`SolveOutcome`](crate::SolveOutcome).
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// Right-hand side and initial guess live on different grids.
    GeometryMismatch {
        /// Description of the mismatch.
        reason: String,
    },
    /// The solver produced a non-finite residual or solution.
    NonFinite {
        /// Residual norm at the point of failure.
        residual_norm: f64,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeometryMismatch { reason } => write!(f, "geometry mismatch: {reason}"),
            Self::NonFinite { residual_norm } => {
                write!(f, "solver diverged (residual {residual_norm})")
            }
        }
    }
}

impl Error for SolverError {}

/// Errors from a full time step (`Integrator::step` in `strand-engine`).
///
/// Every variant aborts the step before the fluid state is committed;
/// the integrator refuses further steps afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A chain neighbour lookup failed.
    Connectivity(ConnectivityError),
    /// Redistribution left ownership inconsistent.
    Migration(MigrationError),
    /// The filament sequence invariant was violated.
    Sequence(SequenceError),
    /// The viscous solver failed hard.
    Solver(SolverError),
    /// A neighbour list was used after the store it indexes changed.
    StaleNeighborList {
        /// Store epoch the list was built against.
        built: u64,
        /// Current store epoch.
        current: u64,
    },
    /// A previous step failed; the marker state is no longer trustworthy.
    Poisoned,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Migration(e) => write!(f, "migration: {e}"),
            Self::Sequence(e) => write!(f, "sequence: {e}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::StaleNeighborList { built, current } => write!(
                f,
                "neighbour list built at epoch {built} used at epoch {current}"
            ),
            Self::Poisoned => write!(f, "integrator poisoned by an earlier failed step"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connectivity(e) => Some(e),
            Self::Migration(e) => Some(e),
            Self::Sequence(e) => Some(e),
            Self::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConnectivityError> for StepError {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<MigrationError> for StepError {
    fn from(e: MigrationError) -> Self {
        Self::Migration(e)
    }
}

impl From<SequenceError> for StepError {
    fn from(e: SequenceError) -> Self {
        Self::Sequence(e)
    }
}

impl From<SolverError> for StepError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}
