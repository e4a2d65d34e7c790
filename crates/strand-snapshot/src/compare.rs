//! Restart verification: per-marker comparison of two snapshots.
//!
//! Hash-first comparison (fast path) with a per-marker bit-exact
//! fallback on mismatch. Records are matched by marker id, so the two
//! snapshots may list markers in any order.

use indexmap::IndexMap;
use strand_core::MarkerId;

use crate::hash::snapshot_hash;
use crate::types::{MarkerRecord, Snapshot};

/// What differs for one marker.
#[derive(Clone, Debug, PartialEq)]
pub enum DivergenceKind {
    /// Present in the recorded snapshot only.
    Missing,
    /// Present in the replayed snapshot only.
    Unexpected,
    /// Filament or sequence index differ.
    Topology {
        /// Recorded `(filament, sequence_index)`.
        recorded: (u32, u32),
        /// Replayed `(filament, sequence_index)`.
        replayed: (u32, u32),
    },
    /// Positions differ.
    Position {
        /// Recorded value.
        recorded: [f64; 3],
        /// Replayed value.
        replayed: [f64; 3],
    },
    /// Velocities differ.
    Velocity {
        /// Recorded value.
        recorded: [f64; 3],
        /// Replayed value.
        replayed: [f64; 3],
    },
    /// Forces differ.
    Force {
        /// Recorded value.
        recorded: [f64; 3],
        /// Replayed value.
        replayed: [f64; 3],
    },
}

/// A single marker-level divergence.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerDivergence {
    /// The marker.
    pub marker: MarkerId,
    /// What differs.
    pub kind: DivergenceKind,
}

/// Every divergence found between two snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceReport {
    /// Recorded step.
    pub recorded_step: u64,
    /// Replayed step.
    pub replayed_step: u64,
    /// Per-marker divergences, in recorded order followed by unexpected
    /// markers. Empty when only the header differs.
    pub divergences: Vec<MarkerDivergence>,
}

fn bits(v: [f64; 3]) -> [u64; 3] {
    v.map(f64::to_bits)
}

/// Compare `replayed` against `recorded`.
///
/// Returns `None` when the headers and every marker match bit for bit.
pub fn compare_snapshots(recorded: &Snapshot, replayed: &Snapshot) -> Option<DivergenceReport> {
    let same_header = recorded.header.step == replayed.header.step
        && recorded.header.time.to_bits() == replayed.header.time.to_bits()
        && recorded.header.marker_count == replayed.header.marker_count;
    if same_header
        && recorded.records.len() == replayed.records.len()
        && snapshot_hash(&recorded.records) == snapshot_hash(&replayed.records)
    {
        return None;
    }

    let mut by_id: IndexMap<u64, &MarkerRecord> =
        replayed.records.iter().map(|r| (r.id, r)).collect();
    let mut divergences = Vec::new();

    for rec in &recorded.records {
        let marker = MarkerId(rec.id);
        let Some(rep) = by_id.shift_remove(&rec.id) else {
            divergences.push(MarkerDivergence {
                marker,
                kind: DivergenceKind::Missing,
            });
            continue;
        };
        divergences.extend(diff(rec, rep).into_iter().map(|kind| MarkerDivergence { marker, kind }));
    }
    divergences.extend(by_id.keys().map(|&id| MarkerDivergence {
        marker: MarkerId(id),
        kind: DivergenceKind::Unexpected,
    }));

    if same_header && divergences.is_empty() {
        return None;
    }
    Some(DivergenceReport {
        recorded_step: recorded.header.step,
        replayed_step: replayed.header.step,
        divergences,
    })
}

fn diff(rec: &MarkerRecord, rep: &MarkerRecord) -> Vec<DivergenceKind> {
    let mut out = Vec::new();
    if (rec.filament, rec.sequence_index) != (rep.filament, rep.sequence_index) {
        out.push(DivergenceKind::Topology {
            recorded: (rec.filament, rec.sequence_index),
            replayed: (rep.filament, rep.sequence_index),
        });
    }
    if bits(rec.position) != bits(rep.position) {
        out.push(DivergenceKind::Position {
            recorded: rec.position,
            replayed: rep.position,
        });
    }
    if bits(rec.velocity) != bits(rep.velocity) {
        out.push(DivergenceKind::Velocity {
            recorded: rec.velocity,
            replayed: rep.velocity,
        });
    }
    if bits(rec.force) != bits(rep.force) {
        out.push(DivergenceKind::Force {
            recorded: rec.force,
            replayed: rep.force,
        });
    }
    out
}
