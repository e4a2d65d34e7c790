//! Strand: an immersed-boundary engine coupling elastic filaments to a
//! viscous fluid.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strand sub-crates. The viscous solve is supplied by the caller
//! through [`types::StokesSolver`] and [`types::FluidOperator`].
//!
//! # Quick start
//!
//! ```rust
//! use strand::prelude::*;
//! use strand_test_utils::{flagellum_spec, unit_box, PeriodicStokes};
//!
//! let geometry = unit_box(16);
//! let decomp = BlockDecomposition::new(&geometry, [2, 1, 1]).unwrap();
//! let config = IntegratorConfig {
//!     filaments: vec![flagellum_spec(Vec3::new(0.25, 0.5, 0.5))],
//!     ..IntegratorConfig::default()
//! };
//! let mut fluid = FluidState::at_rest(&geometry);
//! let mut engine = Integrator::new(
//!     config,
//!     geometry,
//!     decomp,
//!     PeriodicStokes::default(),
//!     PeriodicStokes::default(),
//! )
//! .unwrap();
//! let report = engine.step(&mut fluid).unwrap();
//! assert_eq!(report.step, StepId(1));
//! assert_eq!(engine.store().len(), 8);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strand-core` | IDs, geometry, errors, collaborator traits |
//! | [`grid`] | `strand-grid` | Field storage and block decomposition |
//! | [`markers`] | `strand-markers` | Markers, filaments, store, neighbour lists |
//! | [`forces`] | `strand-forces` | Elastic forces, actuation, constraints |
//! | [`coupling`] | `strand-coupling` | Delta kernels, interpolation, spreading |
//! | [`engine`] | `strand-engine` | Predictor-corrector integrator |
//! | [`snapshot`] | `strand-snapshot` | Restart snapshots and divergence reports |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`strand-core`).
///
/// Contains grid geometry, error types, and the collaborator traits
/// ([`types::EulerianFieldStore`], [`types::StokesSolver`],
/// [`types::DomainDecomposition`]).
pub use strand_core as types;

/// Field storage and decomposition (`strand-grid`).
pub use strand_grid as grid;

/// Markers, filaments and the partitioned store (`strand-markers`).
///
/// [`markers::MarkerStore`] owns every marker; [`markers::NeighborIndex`]
/// builds the per-subdomain neighbour lists the force pass walks.
pub use strand_markers as markers;

/// Spring and bending forces (`strand-forces`).
pub use strand_forces as forces;

/// Marker/grid transfer (`strand-coupling`).
///
/// [`coupling::interpolate_markers`] and [`coupling::spread_markers`] are
/// adjoint for every [`coupling::DeltaKernel`].
pub use strand_coupling as coupling;

/// The time integrator (`strand-engine`).
pub use strand_engine as engine;

/// Marker snapshots (`strand-snapshot`).
///
/// Write with [`snapshot::SnapshotWriter`], read back with
/// [`snapshot::SnapshotReader`], and compare two runs with
/// [`snapshot::compare_snapshots`].
pub use strand_snapshot as snapshot;

/// Common imports for typical Strand usage.
///
/// ```rust
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use strand_core::{
        Axis, DomainDecomposition, EulerianFieldStore, FilamentId, FluidOperator, GridGeometry,
        MarkerId, SolveOutcome, StepId, StokesSolver, SubdomainId, Vec3, ViscosityCoeffs,
    };

    // Errors
    pub use strand_core::{ConnectivityError, MigrationError, SequenceError, SolverError, StepError};

    // Grid
    pub use strand_grid::{BlockDecomposition, CellField, FaceField};

    // Markers
    pub use strand_markers::{Actuation, FilamentSpec, Marker, MarkerStore, Stage};

    // Forces and coupling
    pub use strand_coupling::DeltaKernel;
    pub use strand_forces::{Constraint, ForceModel};

    // Engine
    pub use strand_engine::{
        ConfigError, ExternalForcing, FluidState, Integrator, IntegratorConfig, StepMetrics,
        StepReport,
    };

    // Snapshots
    pub use strand_snapshot::{Snapshot, SnapshotReader, SnapshotWriter};
}
