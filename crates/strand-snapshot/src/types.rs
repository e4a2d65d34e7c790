//! Data types for snapshot records.

use strand_core::{FilamentId, MarkerId, StepId, Vec3};
use strand_markers::{Marker, MarkerStore};

/// Encoded size of one [`MarkerRecord`] in bytes.
pub const RECORD_SIZE: usize = 8 + 4 + 4 + 3 * 3 * 8;

/// Run position stored at the head of a snapshot.
///
/// # Examples
///
/// ```
/// use strand_snapshot::SnapshotHeader;
///
/// let h = SnapshotHeader { step: 10, time: 1.0e-3, marker_count: 8 };
/// assert_eq!(h.marker_count, 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotHeader {
    /// Completed steps.
    pub step: u64,
    /// Simulation time.
    pub time: f64,
    /// Number of records that follow.
    pub marker_count: u64,
}

/// The persistent state of one marker.
///
/// Predictor-stage fields are not stored: they are recomputed at the
/// start of every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRecord {
    /// Marker id.
    pub id: u64,
    /// Filament id.
    pub filament: u32,
    /// Position along the filament.
    pub sequence_index: u32,
    /// Committed position.
    pub position: [f64; 3],
    /// Committed velocity.
    pub velocity: [f64; 3],
    /// Committed (averaged) force.
    pub force: [f64; 3],
}

impl MarkerRecord {
    /// Rebuild the marker. Predictor fields start from the committed
    /// position with zero velocity and force.
    pub fn to_marker(&self) -> Marker {
        let mut m = Marker::new(
            MarkerId(self.id),
            FilamentId(self.filament),
            self.sequence_index,
            Vec3::from_array(self.position),
        );
        m.velocity = Vec3::from_array(self.velocity);
        m.force = Vec3::from_array(self.force);
        m
    }
}

impl From<&Marker> for MarkerRecord {
    fn from(m: &Marker) -> Self {
        Self {
            id: m.id.0,
            filament: m.filament.0,
            sequence_index: m.sequence_index,
            position: m.position.to_array(),
            velocity: m.velocity.to_array(),
            force: m.force.to_array(),
        }
    }
}

/// A complete in-memory snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Run position.
    pub header: SnapshotHeader,
    /// One record per marker, in no particular order.
    pub records: Vec<MarkerRecord>,
}

impl Snapshot {
    /// Capture every owned marker of `store`, in store order.
    pub fn capture(store: &MarkerStore, step: StepId, time: f64) -> Self {
        let records: Vec<MarkerRecord> = store.iter().map(MarkerRecord::from).collect();
        Self {
            header: SnapshotHeader {
                step: step.0,
                time,
                marker_count: records.len() as u64,
            },
            records,
        }
    }

    /// Step the snapshot was taken at.
    pub fn step(&self) -> StepId {
        StepId(self.header.step)
    }

    /// Rebuilt markers, in record order.
    pub fn markers(&self) -> impl Iterator<Item = Marker> + '_ {
        self.records.iter().map(MarkerRecord::to_marker)
    }
}
