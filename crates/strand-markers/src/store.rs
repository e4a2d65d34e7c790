//! Partitioned marker ownership, redistribution and ghost exchange.

use std::collections::HashSet;

use strand_core::{
    DomainDecomposition, FilamentId, MarkerId, MigrationError, SequenceError, SubdomainId, Vec3,
};

use crate::filament::FilamentRegistry;
use crate::marker::{Marker, Stage};
use crate::neighbor::NeighborRef;

/// Address of an owned marker: its subdomain and slot in that
/// subdomain's marker array. Valid until the next redistribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    /// Owning subdomain.
    pub subdomain: SubdomainId,
    /// Index into the owner's marker array.
    pub slot: u32,
}

/// Read-only replica of a marker owned by another subdomain (or a
/// periodic image of a marker owned by this one).
///
/// `force` is a provisional accumulator: anything written there is
/// folded back onto the owner by [`MarkerStore::sum_neighbors`] and must
/// not be read as the marker's force.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostMarker {
    /// Id of the original.
    pub id: MarkerId,
    /// Filament of the original.
    pub filament: FilamentId,
    /// Sequence index of the original.
    pub sequence_index: u32,
    /// Where the original lives.
    pub origin: MarkerKey,
    /// Periodic shift applied to the position.
    pub shift: Vec3,
    /// Stage position of the original plus `shift`.
    pub position: Vec3,
    /// Provisional force contributions.
    pub force: Vec3,
}

/// The identity and position of a neighbour-list entry, whether it is
/// owned or a ghost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerView {
    /// Marker id.
    pub id: MarkerId,
    /// Filament.
    pub filament: FilamentId,
    /// Sequence index.
    pub sequence_index: u32,
    /// Position for the stage the view was taken in (ghosts: shifted).
    pub position: Vec3,
}

/// Markers owned by one subdomain plus the ghosts it currently holds.
#[derive(Clone, Debug)]
pub struct Partition {
    id: SubdomainId,
    markers: Vec<Marker>,
    ghosts: Vec<GhostMarker>,
}

impl Partition {
    fn new(id: SubdomainId) -> Self {
        Self {
            id,
            markers: Vec::new(),
            ghosts: Vec::new(),
        }
    }

    /// Subdomain this partition belongs to.
    pub fn id(&self) -> SubdomainId {
        self.id
    }

    /// Owned markers.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Owned markers, mutably. The slice cannot grow or shrink; ownership
    /// only changes through [`MarkerStore::redistribute`].
    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    /// Ghosts received in the last exchange.
    pub fn ghosts(&self) -> &[GhostMarker] {
        &self.ghosts
    }

    /// Ghosts, mutably (for provisional force writes).
    pub fn ghosts_mut(&mut self) -> &mut [GhostMarker] {
        &mut self.ghosts
    }

    /// Owned markers and ghosts, mutably, at the same time.
    pub fn split_mut(&mut self) -> (&mut [Marker], &mut [GhostMarker]) {
        (&mut self.markers, &mut self.ghosts)
    }

    /// Resolve a neighbour-list entry.
    ///
    /// # Panics
    ///
    /// Panics if `r` does not index this partition (a neighbour list
    /// built for a different partition or epoch).
    pub fn view(&self, r: NeighborRef, stage: Stage) -> MarkerView {
        match r {
            NeighborRef::Local(i) => {
                let m = &self.markers[i as usize];
                MarkerView {
                    id: m.id,
                    filament: m.filament,
                    sequence_index: m.sequence_index,
                    position: m.stage_position(stage),
                }
            }
            NeighborRef::Ghost(i) => {
                let g = &self.ghosts[i as usize];
                MarkerView {
                    id: g.id,
                    filament: g.filament,
                    sequence_index: g.sequence_index,
                    position: g.position,
                }
            }
        }
    }
}

/// Counts from one [`MarkerStore::redistribute`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedistributeStats {
    /// Markers that changed owner.
    pub migrated: usize,
    /// Total owned markers afterwards.
    pub owned: usize,
}

/// The distributed set of markers.
///
/// Each subdomain of the decomposition is represented by one
/// [`Partition`]. The `epoch` counter advances whenever ownership or the
/// ghost set changes; neighbour lists record the epoch they were built
/// against and are rejected once it moves on.
#[derive(Clone, Debug)]
pub struct MarkerStore {
    partitions: Vec<Partition>,
    epoch: u64,
    ghost_stage: Option<Stage>,
}

impl MarkerStore {
    /// Empty store with `subdomain_count` partitions.
    pub fn new(subdomain_count: usize) -> Self {
        Self {
            partitions: (0..subdomain_count)
                .map(|i| Partition::new(SubdomainId(i as u32)))
                .collect(),
            epoch: 0,
            ghost_stage: None,
        }
    }

    /// Distribute `markers` to the subdomains containing their committed
    /// positions.
    pub fn from_markers<D: DomainDecomposition>(
        markers: impl IntoIterator<Item = Marker>,
        decomp: &D,
    ) -> Result<Self, MigrationError> {
        let mut store = Self::new(decomp.subdomain_count());
        let mut seen = HashSet::new();
        for m in markers {
            if !seen.insert(m.id) {
                return Err(MigrationError::MarkerDuplicated { marker: m.id });
            }
            store.insert(m, decomp)?;
        }
        Ok(store)
    }

    /// Add a marker to `subdomain` without checking placement.
    ///
    /// # Panics
    ///
    /// Panics if `subdomain` is out of range.
    pub fn add(&mut self, subdomain: SubdomainId, marker: Marker) {
        self.partitions[subdomain.index()].markers.push(marker);
        self.epoch += 1;
    }

    /// Add a marker to the subdomain containing its committed position.
    pub fn insert<D: DomainDecomposition>(
        &mut self,
        marker: Marker,
        decomp: &D,
    ) -> Result<SubdomainId, MigrationError> {
        let owner = owner_of(decomp, &marker, Stage::Corrector)?;
        self.add(owner, marker);
        Ok(owner)
    }

    /// All partitions, in subdomain order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Partition of `subdomain`.
    pub fn partition(&self, subdomain: SubdomainId) -> Option<&Partition> {
        self.partitions.get(subdomain.index())
    }

    /// Partition of `subdomain`, mutably.
    pub fn partition_mut(&mut self, subdomain: SubdomainId) -> Option<&mut Partition> {
        self.partitions.get_mut(subdomain.index())
    }

    /// Every owned marker, subdomain by subdomain.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.partitions.iter().flat_map(|p| p.markers.iter())
    }

    /// Every owned marker, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Marker> {
        self.partitions.iter_mut().flat_map(|p| p.markers.iter_mut())
    }

    /// Total owned markers.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.markers.len()).sum()
    }

    /// Whether no marker is owned anywhere.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total ghosts currently held.
    pub fn ghost_count(&self) -> usize {
        self.partitions.iter().map(|p| p.ghosts.len()).sum()
    }

    /// Current ownership epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Locate an owned marker by id (linear scan).
    pub fn find(&self, id: MarkerId) -> Option<(MarkerKey, &Marker)> {
        self.partitions.iter().find_map(|p| {
            p.markers.iter().enumerate().find_map(|(slot, m)| {
                (m.id == id).then_some((
                    MarkerKey {
                        subdomain: p.id,
                        slot: slot as u32,
                    },
                    m,
                ))
            })
        })
    }

    /// Re-home every marker to the subdomain containing its `stage`
    /// position.
    ///
    /// Owners are computed for every marker before anything moves, so an
    /// out-of-domain marker leaves the store untouched. Ghosts are
    /// dropped and the epoch advances, invalidating neighbour lists.
    pub fn redistribute<D: DomainDecomposition>(
        &mut self,
        decomp: &D,
        stage: Stage,
    ) -> Result<RedistributeStats, MigrationError> {
        let before = self.len();

        let n = self.partitions.len();
        let mut owners = Vec::with_capacity(n);
        for p in &self.partitions {
            let o: Vec<SubdomainId> = p
                .markers
                .iter()
                .map(|m| {
                    let o = owner_of(decomp, m, stage)?;
                    if o.index() >= n {
                        return Err(MigrationError::OutsideDomain {
                            marker: m.id,
                            position: m.stage_position(stage).to_array(),
                        });
                    }
                    Ok(o)
                })
                .collect::<Result<_, _>>()?;
            owners.push(o);
        }

        let mut outgoing: Vec<(SubdomainId, Marker)> = Vec::new();
        for (p, owners) in self.partitions.iter_mut().zip(owners) {
            let here = p.id;
            let (stay, go): (Vec<_>, Vec<_>) = std::mem::take(&mut p.markers)
                .into_iter()
                .zip(owners)
                .partition(|(_, o)| *o == here);
            p.markers = stay.into_iter().map(|(m, _)| m).collect();
            outgoing.extend(go.into_iter().map(|(m, o)| (o, m)));
            p.ghosts.clear();
        }

        let migrated = outgoing.len();
        for (owner, m) in outgoing {
            self.partitions[owner.index()].markers.push(m);
        }
        self.ghost_stage = None;
        self.epoch += 1;

        let after = self.len();
        if after != before {
            return Err(MigrationError::MarkerLost { before, after });
        }
        let mut seen = HashSet::with_capacity(after);
        for m in self.iter() {
            if !seen.insert(m.id) {
                return Err(MigrationError::MarkerDuplicated { marker: m.id });
            }
        }

        if migrated > 0 {
            log::debug!("redistribute: {migrated} of {after} markers changed owner");
        }
        Ok(RedistributeStats {
            migrated,
            owned: after,
        })
    }

    /// Check every marker is owned by the subdomain containing its
    /// `stage` position.
    pub fn verify_ownership<D: DomainDecomposition>(
        &self,
        decomp: &D,
        stage: Stage,
    ) -> Result<(), MigrationError> {
        for p in &self.partitions {
            for m in &p.markers {
                let expected = owner_of(decomp, m, stage)?;
                if expected != p.id {
                    return Err(MigrationError::WrongOwner {
                        marker: m.id,
                        owner: p.id,
                        expected,
                    });
                }
            }
        }
        Ok(())
    }

    /// Replace every partition's ghosts with fresh copies of the markers
    /// within `cutoff` of its region, taken at their `stage` positions.
    ///
    /// Returns the number of ghosts created.
    pub fn exchange_ghosts<D: DomainDecomposition>(
        &mut self,
        decomp: &D,
        cutoff: f64,
        stage: Stage,
    ) -> usize {
        let mut incoming: Vec<Vec<GhostMarker>> = vec![Vec::new(); self.partitions.len()];
        for p in &self.partitions {
            for (slot, m) in p.markers.iter().enumerate() {
                let pos = m.stage_position(stage);
                for t in decomp.ghost_targets(pos, cutoff) {
                    if let Some(inbox) = incoming.get_mut(t.subdomain.index()) {
                        inbox.push(GhostMarker {
                            id: m.id,
                            filament: m.filament,
                            sequence_index: m.sequence_index,
                            origin: MarkerKey {
                                subdomain: p.id,
                                slot: slot as u32,
                            },
                            shift: t.shift,
                            position: pos + t.shift,
                            force: Vec3::ZERO,
                        });
                    }
                }
            }
        }
        let mut total = 0;
        for (p, ghosts) in self.partitions.iter_mut().zip(incoming) {
            total += ghosts.len();
            p.ghosts = ghosts;
        }
        self.ghost_stage = Some(stage);
        self.epoch += 1;
        log::trace!("exchange_ghosts: {total} ghosts at cutoff {cutoff}");
        total
    }

    /// Fold provisional ghost forces onto their owners' `stage` force
    /// and clear the ghost accumulators.
    ///
    /// After this returns, every owned marker's stage force holds the
    /// complete contribution and no ghost carries force.
    pub fn sum_neighbors(&mut self, stage: Stage) {
        debug_assert!(
            self.ghost_stage.is_none_or(|s| s == stage),
            "ghosts were exchanged for a different stage"
        );
        let mut contributions: Vec<(MarkerKey, Vec3)> = Vec::new();
        for p in &mut self.partitions {
            for g in &mut p.ghosts {
                if g.force != Vec3::ZERO {
                    contributions.push((g.origin, g.force));
                    g.force = Vec3::ZERO;
                }
            }
        }
        for (key, f) in contributions {
            if let Some(m) = self
                .partitions
                .get_mut(key.subdomain.index())
                .and_then(|p| p.markers.get_mut(key.slot as usize))
            {
                *m.stage_force_mut(stage) += f;
            }
        }
    }

    /// Verify each registered filament's sequence indices are exactly
    /// `{0, …, N−1}` across all subdomains.
    pub fn check_sequences(&self, registry: &FilamentRegistry) -> Result<(), SequenceError> {
        let mut counts: Vec<Vec<u32>> = registry
            .iter()
            .map(|(_, s)| vec![0; s.n_markers as usize])
            .collect();

        for m in self.iter() {
            let Some(fi) = registry.index_of(m.filament) else {
                return Err(SequenceError::UnknownFilament {
                    filament: m.filament,
                });
            };
            let dup = SequenceError::Duplicate {
                filament: m.filament,
                sequence_index: m.sequence_index,
            };
            let Some(c) = counts[fi].get_mut(m.sequence_index as usize) else {
                return Err(dup);
            };
            *c += 1;
            if *c > 1 {
                return Err(dup);
            }
        }

        for ((filament, _), c) in registry.iter().zip(&counts) {
            if let Some(s) = c.iter().position(|&n| n == 0) {
                return Err(SequenceError::Gap {
                    filament,
                    sequence_index: s as u32,
                });
            }
        }
        Ok(())
    }
}

fn owner_of<D: DomainDecomposition>(
    decomp: &D,
    m: &Marker,
    stage: Stage,
) -> Result<SubdomainId, MigrationError> {
    let pos = m.stage_position(stage);
    decomp
        .owner_of(pos)
        .ok_or(MigrationError::OutsideDomain {
            marker: m.id,
            position: pos.to_array(),
        })
}
