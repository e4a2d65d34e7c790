//! Filament configuration, validation and initial seeding.

use std::error::Error;
use std::f64::consts::TAU;
use std::fmt;

use indexmap::IndexMap;
use strand_core::{FilamentId, MarkerId, Vec3};

use crate::marker::Marker;

/// Time-dependent target curvature driving the beat.
///
/// The target bending angle at sequence index `s` is
/// `l0 * A(t) * sin(ω t + 2π s l0 / λ + φ)` where the amplitude ramps in
/// linearly over `ramp_time`.
#[derive(Clone, Debug, PartialEq)]
pub struct Actuation {
    /// Peak curvature amplitude.
    pub amplitude: f64,
    /// Angular frequency `ω` of the beat.
    pub angular_frequency: f64,
    /// Wavelength `λ` along the filament. `None` means one filament length.
    pub wavelength: Option<f64>,
    /// Constant phase offset `φ`.
    pub phase_offset: f64,
    /// Time over which the amplitude ramps from zero. `0` disables the ramp.
    pub ramp_time: f64,
}

impl Actuation {
    /// No actuation: the filament relaxes toward straight.
    pub fn none() -> Self {
        Self::default()
    }

    /// Amplitude in effect at time `t`.
    pub fn amplitude_at(&self, t: f64) -> f64 {
        if self.ramp_time > 0.0 {
            self.amplitude * (t / self.ramp_time).clamp(0.0, 1.0)
        } else {
            self.amplitude
        }
    }

    /// Phase of marker `sequence_index` on a filament of `length` with
    /// link length `rest_length`.
    pub fn phase(&self, sequence_index: u32, rest_length: f64, length: f64) -> f64 {
        let wavelength = self.wavelength.unwrap_or(length);
        TAU * sequence_index as f64 * rest_length / wavelength + self.phase_offset
    }

    /// Whether this actuation never produces a non-zero target angle.
    pub fn is_inactive(&self) -> bool {
        self.amplitude == 0.0
    }
}

impl Default for Actuation {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            angular_frequency: 0.0,
            wavelength: None,
            phase_offset: 0.0,
            ramp_time: 0.0,
        }
    }
}

/// One filament: an ordered chain of `n_markers` markers.
#[derive(Clone, Debug, PartialEq)]
pub struct FilamentSpec {
    /// Number of markers, at least 3.
    pub n_markers: u32,
    /// Total length `L`.
    pub length: f64,
    /// Spring stiffness `k_s`.
    pub spring_k: f64,
    /// Bending stiffness `k_b`.
    pub bending_k: f64,
    /// Beat parameters.
    pub actuation: Actuation,
    /// Position of marker 0 at seeding.
    pub origin: Vec3,
    /// Direction the straight filament is laid out along.
    pub direction: Vec3,
    /// Axis the bending rotation is taken about.
    pub bending_axis: Vec3,
}

impl Default for FilamentSpec {
    fn default() -> Self {
        Self {
            n_markers: 8,
            length: 0.5,
            spring_k: 1.0e4,
            bending_k: 1.0e4,
            actuation: Actuation::default(),
            origin: Vec3::ZERO,
            direction: Vec3::X,
            bending_axis: Vec3::Z,
        }
    }
}

impl FilamentSpec {
    /// Rest link length `l0 = L / N`.
    pub fn rest_length(&self) -> f64 {
        self.length / self.n_markers as f64
    }

    /// Check the spec is usable.
    pub fn validate(&self) -> Result<(), FilamentError> {
        // 1. Bending needs a triplet.
        if self.n_markers < 3 {
            return Err(FilamentError::TooFewMarkers {
                n_markers: self.n_markers,
            });
        }
        // 2. Geometry.
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(FilamentError::InvalidParameter {
                name: "length",
                value: self.length,
            });
        }
        // 3. Stiffnesses.
        for (name, value) in [("spring_k", self.spring_k), ("bending_k", self.bending_k)] {
            if !value.is_finite() || value < 0.0 {
                return Err(FilamentError::InvalidParameter { name, value });
            }
        }
        // 4. Directions.
        for (name, v) in [
            ("origin", self.origin),
            ("direction", self.direction),
            ("bending_axis", self.bending_axis),
        ] {
            if !v.is_finite() {
                return Err(FilamentError::DegenerateVector { name });
            }
        }
        if self.direction.length_squared() == 0.0 {
            return Err(FilamentError::DegenerateVector { name: "direction" });
        }
        if self.bending_axis.length_squared() == 0.0 {
            return Err(FilamentError::DegenerateVector {
                name: "bending_axis",
            });
        }
        // 5. Actuation.
        let a = &self.actuation;
        for (name, value) in [
            ("actuation.amplitude", a.amplitude),
            ("actuation.angular_frequency", a.angular_frequency),
            ("actuation.phase_offset", a.phase_offset),
        ] {
            if !value.is_finite() {
                return Err(FilamentError::InvalidParameter { name, value });
            }
        }
        if !a.ramp_time.is_finite() || a.ramp_time < 0.0 {
            return Err(FilamentError::InvalidParameter {
                name: "actuation.ramp_time",
                value: a.ramp_time,
            });
        }
        if let Some(w) = a.wavelength {
            if !w.is_finite() || w <= 0.0 {
                return Err(FilamentError::InvalidParameter {
                    name: "actuation.wavelength",
                    value: w,
                });
            }
        }
        Ok(())
    }

    /// Lay the filament out straight from `origin` along `direction`,
    /// spaced by the rest length, with ids starting at `first_id`.
    pub fn seed_markers(&self, filament: FilamentId, first_id: MarkerId) -> Vec<Marker> {
        let dir = self.direction.normalize_or_zero();
        let l0 = self.rest_length();
        (0..self.n_markers)
            .map(|s| {
                Marker::new(
                    MarkerId(first_id.0 + s as u64),
                    filament,
                    s,
                    self.origin + dir * (l0 * s as f64),
                )
            })
            .collect()
    }
}

/// Invalid filament configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum FilamentError {
    /// Fewer than three markers: no bending triplet exists.
    TooFewMarkers {
        /// Configured marker count.
        n_markers: u32,
    },
    /// A scalar parameter is non-finite or out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A vector parameter is zero or non-finite.
    DegenerateVector {
        /// Parameter name.
        name: &'static str,
    },
    /// Two specs registered under the same id.
    DuplicateId {
        /// The repeated id.
        filament: FilamentId,
    },
}

impl fmt::Display for FilamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewMarkers { n_markers } => {
                write!(f, "filament needs at least 3 markers, got {n_markers}")
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid filament parameter {name} = {value}")
            }
            Self::DegenerateVector { name } => write!(f, "filament {name} is degenerate"),
            Self::DuplicateId { filament } => write!(f, "filament {filament} registered twice"),
        }
    }
}

impl Error for FilamentError {}

/// All filaments of a run, in registration order.
///
/// Topology is fixed after construction.
#[derive(Clone, Debug, Default)]
pub struct FilamentRegistry {
    specs: IndexMap<FilamentId, FilamentSpec>,
}

impl FilamentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `specs` as filaments `0, 1, 2, …`.
    pub fn from_specs(specs: impl IntoIterator<Item = FilamentSpec>) -> Result<Self, FilamentError> {
        let mut reg = Self::new();
        for (i, spec) in specs.into_iter().enumerate() {
            reg.insert(FilamentId(i as u32), spec)?;
        }
        Ok(reg)
    }

    /// Validate and register one filament.
    pub fn insert(&mut self, id: FilamentId, spec: FilamentSpec) -> Result<(), FilamentError> {
        spec.validate()?;
        if self.specs.contains_key(&id) {
            return Err(FilamentError::DuplicateId { filament: id });
        }
        self.specs.insert(id, spec);
        Ok(())
    }

    /// Spec of filament `id`.
    pub fn get(&self, id: FilamentId) -> Option<&FilamentSpec> {
        self.specs.get(&id)
    }

    /// Registration index of filament `id`.
    pub fn index_of(&self, id: FilamentId) -> Option<usize> {
        self.specs.get_index_of(&id)
    }

    /// Number of filaments.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no filament is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Filaments in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FilamentId, &FilamentSpec)> {
        self.specs.iter().map(|(id, s)| (*id, s))
    }

    /// Total markers over all filaments.
    pub fn total_markers(&self) -> usize {
        self.specs.values().map(|s| s.n_markers as usize).sum()
    }

    /// Longest rest link length; the neighbour cutoff must exceed it.
    pub fn max_rest_length(&self) -> f64 {
        self.specs
            .values()
            .map(FilamentSpec::rest_length)
            .fold(0.0, f64::max)
    }

    /// Seed every filament, assigning marker ids contiguously in
    /// registration order.
    pub fn seed_all(&self) -> Vec<Marker> {
        let mut out = Vec::with_capacity(self.total_markers());
        let mut next = 0u64;
        for (id, spec) in self.iter() {
            out.extend(spec.seed_markers(id, MarkerId(next)));
            next += spec.n_markers as u64;
        }
        out
    }
}
