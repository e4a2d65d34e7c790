//! Per-step proximity lists over owned and ghost markers.

use std::collections::HashMap;

use smallvec::SmallVec;
use strand_core::{StepError, SubdomainId, Vec3};

use crate::marker::Stage;
use crate::store::{MarkerStore, Partition};

/// An entry in a neighbour list: an owned marker slot or a ghost slot of
/// the same partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeighborRef {
    /// Index into [`Partition::markers`].
    Local(u32),
    /// Index into [`Partition::ghosts`].
    Ghost(u32),
}

/// Neighbours within the cutoff of each owned marker of one partition,
/// in compressed-row form.
///
/// Only valid for the store epoch it was built against; see
/// [`NeighborList::ensure_current`].
#[derive(Clone, Debug)]
pub struct NeighborList {
    subdomain: SubdomainId,
    epoch: u64,
    stage: Stage,
    cutoff: f64,
    offsets: Vec<u32>,
    entries: Vec<NeighborRef>,
}

impl NeighborList {
    /// Subdomain the list indexes.
    pub fn subdomain(&self) -> SubdomainId {
        self.subdomain
    }

    /// Store epoch at build time.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stage whose positions were binned.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Cutoff radius used.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Number of owned markers covered.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Whether the partition had no owned markers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbours of owned marker `local`, excluding itself.
    pub fn neighbors(&self, local: usize) -> &[NeighborRef] {
        let lo = self.offsets[local] as usize;
        let hi = self.offsets[local + 1] as usize;
        &self.entries[lo..hi]
    }

    /// Total directed pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.len()
    }

    /// Fail if the store has changed since this list was built.
    pub fn ensure_current(&self, store: &MarkerStore) -> Result<(), StepError> {
        if self.epoch != store.epoch() {
            return Err(StepError::StaleNeighborList {
                built: self.epoch,
                current: store.epoch(),
            });
        }
        Ok(())
    }
}

type CellKey = [i64; 3];

/// Builds [`NeighborList`]s by binning positions into cubic cells of the
/// cutoff size and scanning the 27 surrounding cells.
#[derive(Clone, Copy, Debug)]
pub struct NeighborIndex {
    cutoff: f64,
}

impl NeighborIndex {
    /// Index with the given cutoff radius.
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    /// Cutoff radius.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn cell_of(&self, p: Vec3) -> CellKey {
        let c = (p / self.cutoff).floor();
        [c.x as i64, c.y as i64, c.z as i64]
    }

    /// Build the list for one partition of `store` from its owned
    /// markers' `stage` positions and its current ghosts.
    pub fn build(&self, store: &MarkerStore, partition: &Partition, stage: Stage) -> NeighborList {
        let n_local = partition.markers().len();
        let candidates = (0..n_local as u32)
            .map(NeighborRef::Local)
            .chain((0..partition.ghosts().len() as u32).map(NeighborRef::Ghost));

        let mut bins: HashMap<CellKey, SmallVec<[NeighborRef; 8]>> = HashMap::new();
        for r in candidates {
            let p = partition.view(r, stage).position;
            bins.entry(self.cell_of(p)).or_default().push(r);
        }

        let cutoff_sq = self.cutoff * self.cutoff;
        let mut offsets = Vec::with_capacity(n_local + 1);
        let mut entries = Vec::new();
        offsets.push(0u32);
        for i in 0..n_local {
            let me = NeighborRef::Local(i as u32);
            let p = partition.view(me, stage).position;
            let [cx, cy, cz] = self.cell_of(p);
            for dz in -1..=1 {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let Some(bin) = bins.get(&[cx + dx, cy + dy, cz + dz]) else {
                            continue;
                        };
                        for &r in bin {
                            if r == me {
                                continue;
                            }
                            let q = partition.view(r, stage).position;
                            if p.distance_squared(q) <= cutoff_sq {
                                entries.push(r);
                            }
                        }
                    }
                }
            }
            offsets.push(entries.len() as u32);
        }

        NeighborList {
            subdomain: partition.id(),
            epoch: store.epoch(),
            stage,
            cutoff: self.cutoff,
            offsets,
            entries,
        }
    }

    /// Build one list per partition.
    pub fn build_all(&self, store: &MarkerStore, stage: Stage) -> Vec<NeighborList> {
        store
            .partitions()
            .iter()
            .map(|p| self.build(store, p, stage))
            .collect()
    }
}
