//! Recovering filament chain neighbours from a neighbour list.

use strand_core::{ConnectivityError, Link};

use crate::filament::FilamentRegistry;
use crate::marker::Stage;
use crate::neighbor::{NeighborList, NeighborRef};
use crate::store::Partition;

/// Where a marker sits along its filament.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainPosition {
    /// Sequence index 0: only a next neighbour.
    Start,
    /// Both neighbours.
    Interior,
    /// Sequence index N−1: only a previous neighbour.
    End,
}

/// Resolved chain neighbours of one owned marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    /// Marker at `sequence_index - 1`, if any.
    pub prev: Option<NeighborRef>,
    /// Marker at `sequence_index + 1`, if any.
    pub next: Option<NeighborRef>,
    /// Classification.
    pub position: ChainPosition,
    /// Lookups that had more than one candidate and were settled by
    /// distance.
    pub tie_breaks: u32,
}

/// Finds each marker's previous and next marker along its filament by
/// `(filament, sequence_index)` lookup in the neighbour list.
#[derive(Clone, Copy, Debug)]
pub struct ConnectivityResolver<'a> {
    registry: &'a FilamentRegistry,
}

impl<'a> ConnectivityResolver<'a> {
    /// Resolver for the filaments in `registry`.
    pub fn new(registry: &'a FilamentRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the chain neighbours of owned marker `local` of
    /// `partition`.
    ///
    /// Every expected neighbour must be present: a miss means a marker
    /// was lost or mis-migrated, or a link outgrew the cutoff, and is
    /// reported as [`ConnectivityError::Broken`]. If more than one entry
    /// carries the wanted sequence index (which correct construction
    /// never produces) the nearest wins and a warning is logged.
    pub fn find_connected(
        &self,
        partition: &Partition,
        local: usize,
        list: &NeighborList,
        stage: Stage,
    ) -> Result<Chain, ConnectivityError> {
        let me = partition.view(NeighborRef::Local(local as u32), stage);
        let spec = self
            .registry
            .get(me.filament)
            .ok_or(ConnectivityError::UnknownFilament {
                marker: me.id,
                filament: me.filament,
            })?;
        let n = spec.n_markers;
        let seq = me.sequence_index;
        let want_prev = seq.checked_sub(1);
        let want_next = (seq + 1 < n).then_some(seq + 1);

        let mut prev = Candidate::default();
        let mut next = Candidate::default();
        for &r in list.neighbors(local) {
            let v = partition.view(r, stage);
            if v.filament != me.filament {
                continue;
            }
            let slot = if Some(v.sequence_index) == want_prev {
                &mut prev
            } else if Some(v.sequence_index) == want_next {
                &mut next
            } else {
                continue;
            };
            slot.offer(r, me.position.distance_squared(v.position));
        }

        let mut tie_breaks = 0;
        for (link, c) in [(Link::Prev, &prev), (Link::Next, &next)] {
            if c.count > 1 {
                tie_breaks += 1;
                log::warn!(
                    "marker {} (filament {}, index {seq}): {} candidates for {link} neighbour, using nearest",
                    me.id,
                    me.filament,
                    c.count
                );
            }
        }

        let broken = |missing| ConnectivityError::Broken {
            marker: me.id,
            filament: me.filament,
            sequence_index: seq,
            missing,
        };
        if want_prev.is_some() && prev.best.is_none() {
            return Err(broken(Link::Prev));
        }
        if want_next.is_some() && next.best.is_none() {
            return Err(broken(Link::Next));
        }

        let position = if seq == 0 {
            ChainPosition::Start
        } else if seq + 1 == n {
            ChainPosition::End
        } else {
            ChainPosition::Interior
        };
        Ok(Chain {
            prev: prev.best.map(|(r, _)| r),
            next: next.best.map(|(r, _)| r),
            position,
            tie_breaks,
        })
    }
}

#[derive(Default)]
struct Candidate {
    best: Option<(NeighborRef, f64)>,
    count: u32,
}

impl Candidate {
    fn offer(&mut self, r: NeighborRef, dist_sq: f64) {
        self.count += 1;
        match self.best {
            Some((_, d)) if d <= dist_sq => {}
            _ => self.best = Some((r, dist_sq)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filament::FilamentSpec;
    use crate::marker::Marker;
    use crate::neighbor::NeighborIndex;
    use crate::store::MarkerStore;
    use strand_core::{FilamentId, GridGeometry, MarkerId, SubdomainId, Vec3};
    use strand_grid::BlockDecomposition;

    fn spec(n: u32) -> FilamentSpec {
        FilamentSpec {
            n_markers: n,
            length: 0.0625 * n as f64,
            origin: Vec3::new(0.2, 0.5, 0.5),
            ..FilamentSpec::default()
        }
    }

    fn build(
        markers: Vec<Marker>,
        blocks: [usize; 3],
    ) -> (MarkerStore, Vec<NeighborList>) {
        let g = GridGeometry::periodic_cube(8, 1.0).unwrap();
        let d = BlockDecomposition::new(&g, blocks).unwrap();
        let mut s = MarkerStore::from_markers(markers, &d).unwrap();
        s.exchange_ghosts(&d, 0.1, Stage::Corrector);
        let lists = NeighborIndex::new(0.1).build_all(&s, Stage::Corrector);
        (s, lists)
    }

    fn resolve_all(reg: &FilamentRegistry, s: &MarkerStore, lists: &[NeighborList]) -> Vec<(u32, Chain)> {
        let r = ConnectivityResolver::new(reg);
        let mut out = Vec::new();
        for (p, list) in s.partitions().iter().zip(lists) {
            for (i, m) in p.markers().iter().enumerate() {
                out.push((m.sequence_index, r.find_connected(p, i, list, Stage::Corrector).unwrap()));
            }
        }
        out.sort_by_key(|(s, _)| *s);
        out
    }

    #[test]
    fn ends_and_interior_are_classified() {
        for n in [3u32, 4, 7, 9] {
            let reg = FilamentRegistry::from_specs([spec(n)]).unwrap();
            let (s, lists) = build(reg.seed_all(), [2, 1, 1]);
            let chains = resolve_all(&reg, &s, &lists);
            assert_eq!(chains.len(), n as usize);
            for (seq, c) in chains {
                let expected = if seq == 0 {
                    ChainPosition::Start
                } else if seq == n - 1 {
                    ChainPosition::End
                } else {
                    ChainPosition::Interior
                };
                assert_eq!(c.position, expected, "n = {n}, seq = {seq}");
                assert_eq!(c.prev.is_some(), seq > 0);
                assert_eq!(c.next.is_some(), seq < n - 1);
                assert_eq!(c.tie_breaks, 0);
            }
        }
    }

    #[test]
    fn resolved_neighbours_have_adjacent_indices() {
        let reg = FilamentRegistry::from_specs([spec(8)]).unwrap();
        let (s, lists) = build(reg.seed_all(), [2, 1, 1]);
        let r = ConnectivityResolver::new(&reg);
        for (p, list) in s.partitions().iter().zip(&lists) {
            for (i, m) in p.markers().iter().enumerate() {
                let c = r.find_connected(p, i, list, Stage::Corrector).unwrap();
                if let Some(prev) = c.prev {
                    assert_eq!(p.view(prev, Stage::Corrector).sequence_index + 1, m.sequence_index);
                }
                if let Some(next) = c.next {
                    assert_eq!(p.view(next, Stage::Corrector).sequence_index, m.sequence_index + 1);
                }
            }
        }
    }

    #[test]
    fn missing_interior_neighbour_is_an_error() {
        let reg = FilamentRegistry::from_specs([spec(5)]).unwrap();
        let mut markers = reg.seed_all();
        markers.remove(2);
        let (s, lists) = build(markers, [1, 1, 1]);
        let p = &s.partitions()[0];
        let slot = p.markers().iter().position(|m| m.sequence_index == 3).unwrap();
        match ConnectivityResolver::new(&reg).find_connected(p, slot, &lists[0], Stage::Corrector) {
            Err(ConnectivityError::Broken {
                marker,
                filament,
                sequence_index: 3,
                missing: Link::Prev,
            }) => {
                assert_eq!(marker, MarkerId(3));
                assert_eq!(filament, FilamentId(0));
            }
            other => panic!("expected Broken, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_candidate_resolves_to_nearest() {
        let reg = FilamentRegistry::from_specs([spec(3)]).unwrap();
        let mut markers = reg.seed_all();
        // A second index-0 marker, farther from index 1 than the real one.
        let mut stray = markers[0].clone();
        stray.id = MarkerId(50);
        stray.position += Vec3::new(0.0, 0.05, 0.0);
        stray.pred_position = stray.position;
        markers.push(stray);
        let (s, lists) = build(markers, [1, 1, 1]);
        let p = s.partition(SubdomainId(0)).unwrap();
        let slot = p.markers().iter().position(|m| m.sequence_index == 1).unwrap();
        let c = ConnectivityResolver::new(&reg)
            .find_connected(p, slot, &lists[0], Stage::Corrector)
            .unwrap();
        assert_eq!(c.tie_breaks, 1);
        assert_eq!(p.view(c.prev.unwrap(), Stage::Corrector).id, MarkerId(0));
    }

    #[test]
    fn unknown_filament_is_an_error() {
        let reg = FilamentRegistry::from_specs([spec(3)]).unwrap();
        let mut markers = reg.seed_all();
        for m in &mut markers {
            m.filament = FilamentId(4);
        }
        let (s, lists) = build(markers, [1, 1, 1]);
        match ConnectivityResolver::new(&reg).find_connected(&s.partitions()[0], 0, &lists[0], Stage::Corrector) {
            Err(ConnectivityError::UnknownFilament { filament, .. }) => assert_eq!(filament, FilamentId(4)),
            other => panic!("expected UnknownFilament, got {other:?}"),
        }
    }
}
