//! Integrator configuration, validation, and error types.
//!
//! [`IntegratorConfig`] is the builder-input for an
//! [`Integrator`](crate::Integrator). [`validate()`](IntegratorConfig::validate)
//! checks everything that does not depend on the domain decomposition;
//! the integrator constructor additionally checks the cutoff against the
//! decomposition's ghost layer.

use std::error::Error;
use std::fmt;

use strand_core::{FilamentId, MigrationError, ViscosityCoeffs};
use strand_coupling::DeltaKernel;
use strand_forces::{Constraint, ForceModel};
use strand_markers::{FilamentError, FilamentRegistry, FilamentSpec};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating an [`IntegratorConfig`] or
/// constructing an integrator from it.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f64,
    },
    /// A fluid property is non-finite or out of range.
    InvalidFluidProperty {
        /// Property name.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// A filament spec failed validation.
    Filament {
        /// Position of the spec in `filaments`.
        index: usize,
        /// What was wrong with it.
        error: FilamentError,
    },
    /// The neighbour cutoff does not exceed the longest rest link, so
    /// chain neighbours could fall outside it.
    CutoffTooSmall {
        /// Configured cutoff.
        cutoff: f64,
        /// Longest rest link length.
        max_rest_length: f64,
    },
    /// The neighbour cutoff is wider than one ghost layer of the
    /// decomposition.
    CutoffExceedsGhostLayer {
        /// Configured cutoff.
        cutoff: f64,
        /// Largest cutoff the decomposition serves.
        max: f64,
    },
    /// Initial markers could not be placed.
    Seeding(MigrationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidFluidProperty { name, value } => {
                write!(f, "invalid fluid property {name} = {value}")
            }
            Self::Filament { index, error } => write!(f, "filament {index}: {error}"),
            Self::CutoffTooSmall {
                cutoff,
                max_rest_length,
            } => write!(
                f,
                "cutoff {cutoff} must exceed the longest rest link {max_rest_length}"
            ),
            Self::CutoffExceedsGhostLayer { cutoff, max } => write!(
                f,
                "cutoff {cutoff} exceeds the decomposition's ghost layer ({max})"
            ),
            Self::Seeding(e) => write!(f, "seeding: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Filament { error, .. } => Some(error),
            Self::Seeding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MigrationError> for ConfigError {
    fn from(e: MigrationError) -> Self {
        Self::Seeding(e)
    }
}

// ── IntegratorConfig ───────────────────────────────────────────────

/// Everything the integrator needs besides its collaborators.
#[derive(Clone, Debug)]
pub struct IntegratorConfig {
    /// Time step.
    pub dt: f64,
    /// Neighbour-list and ghost cutoff radius.
    pub cutoff: f64,
    /// Transfer kernel.
    pub kernel: DeltaKernel,
    /// Elastic terms to evaluate.
    pub force_model: ForceModel,
    /// Projections applied after every velocity and force update.
    pub constraints: Vec<Constraint>,
    /// Filaments, registered as `FilamentId(0), FilamentId(1), …`.
    pub filaments: Vec<FilamentSpec>,
    /// Fluid density `ρ`.
    pub density: f64,
    /// Shear viscosity `μ`.
    pub shear_viscosity: f64,
    /// Bulk viscosity.
    pub bulk_viscosity: f64,
    /// Start each solve from the last committed pressure (and subtract
    /// its gradient from the right-hand side) instead of from zero.
    pub reuse_pressure: bool,
    /// Check the sequence invariant after every redistribution.
    pub check_invariants: bool,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt: 1.0e-4,
            cutoff: 0.1,
            kernel: DeltaKernel::default(),
            force_model: ForceModel::default(),
            constraints: Vec::new(),
            filaments: Vec::new(),
            density: 1.0,
            shear_viscosity: 1.0,
            bulk_viscosity: 0.0,
            reuse_pressure: false,
            check_invariants: true,
        }
    }
}

impl IntegratorConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Time step.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        // 2. Fluid.
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(ConfigError::InvalidFluidProperty {
                name: "density",
                value: self.density,
            });
        }
        for (name, value) in [
            ("shear_viscosity", self.shear_viscosity),
            ("bulk_viscosity", self.bulk_viscosity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFluidProperty { name, value });
            }
        }
        // 3. Filaments.
        for (index, spec) in self.filaments.iter().enumerate() {
            spec.validate()
                .map_err(|error| ConfigError::Filament { index, error })?;
        }
        // 4. Cutoff must see both chain neighbours.
        let max_rest_length = self
            .filaments
            .iter()
            .map(FilamentSpec::rest_length)
            .fold(0.0, f64::max);
        if !self.cutoff.is_finite() || self.cutoff <= max_rest_length {
            return Err(ConfigError::CutoffTooSmall {
                cutoff: self.cutoff,
                max_rest_length,
            });
        }
        Ok(())
    }

    /// Registry of the configured filaments, as `FilamentId(0), FilamentId(1), …`.
    pub fn registry(&self) -> Result<FilamentRegistry, ConfigError> {
        let mut registry = FilamentRegistry::new();
        for (index, spec) in self.filaments.iter().enumerate() {
            registry
                .insert(FilamentId(index as u32), spec.clone())
                .map_err(|error| ConfigError::Filament { index, error })?;
        }
        Ok(registry)
    }

    /// Full viscous operator coefficients: `alpha = ρ / dt`.
    pub fn viscosity(&self) -> ViscosityCoeffs {
        ViscosityCoeffs {
            alpha: self.density / self.dt,
            beta: self.shear_viscosity,
            gamma: self.bulk_viscosity,
        }
    }
}
