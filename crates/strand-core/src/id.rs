//! Strongly-typed identifiers.

use std::fmt;

/// Persistent unique identifier of a Lagrangian marker.
///
/// Assigned once at seeding time and carried through every migration,
/// snapshot and restart. Never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MarkerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a filament (an ordered chain of markers).
///
/// `FilamentId(n)` corresponds to the n-th filament in the run
/// configuration. Markers never change filament after seeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilamentId(pub u32);

impl fmt::Display for FilamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FilamentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one spatial subdomain of the decomposition.
///
/// Each subdomain owns a disjoint region of the domain and every
/// marker whose position lies inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubdomainId(pub u32);

impl SubdomainId {
    /// The subdomain id as a `usize` index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubdomainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing time-step counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
