//! The force pass: local accumulation, ghost reduction, constraints.

use strand_core::{StepError, Vec3};
use strand_markers::{
    ChainPosition, ConnectivityResolver, FilamentRegistry, MarkerStore, NeighborList,
    NeighborRef, Partition, Stage,
};

use crate::actuation::target_angle;
use crate::bending::{bending_forces, bending_rotation};
use crate::constraint::{apply_force_constraints, Constraint};
use crate::model::ForceModel;
use crate::spring::spring_force;

/// Counters from one [`compute_forces`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceStats {
    /// Springs evaluated.
    pub springs: usize,
    /// Bending triplets evaluated.
    pub triplets: usize,
    /// Connectivity lookups settled by distance.
    pub tie_breaks: u32,
    /// Contributions written to ghost copies before reduction.
    pub ghost_writes: usize,
    /// Largest owned-marker force magnitude after reduction.
    pub max_force: f64,
}

/// Compute every owned marker's `stage` force.
///
/// `lists` holds one neighbour list per partition, built at the current
/// store epoch from `stage` positions. Each link is evaluated once, by
/// the owner of its lower-index marker; each bending triplet once, by
/// the owner of its centre marker. Contributions to markers held only as
/// ghosts go to the ghost's accumulator and are folded onto the owner by
/// [`MarkerStore::sum_neighbors`] before `constraints` are applied.
/// Actuation is evaluated at `time`.
pub fn compute_forces(
    store: &mut MarkerStore,
    lists: &[NeighborList],
    registry: &FilamentRegistry,
    model: ForceModel,
    constraints: &[Constraint],
    stage: Stage,
    time: f64,
) -> Result<ForceStats, StepError> {
    for list in lists {
        list.ensure_current(store)?;
        debug_assert_eq!(list.stage(), stage, "neighbour list built for another stage");
    }

    for p in store.partitions().iter().map(Partition::id).collect::<Vec<_>>() {
        if let Some(part) = store.partition_mut(p) {
            let (markers, ghosts) = part.split_mut();
            markers.iter_mut().for_each(|m| *m.stage_force_mut(stage) = Vec3::ZERO);
            ghosts.iter_mut().for_each(|g| g.force = Vec3::ZERO);
        }
    }

    if model.has_bending() && log::log_enabled!(log::Level::Debug) {
        for (id, spec) in registry.iter() {
            log::debug!(
                "filament {id}: actuation amplitude {:.4} at t = {time:.6}",
                spec.actuation.amplitude_at(time)
            );
        }
    }

    let mut stats = ForceStats::default();
    if model != ForceModel::Disabled {
        let resolver = ConnectivityResolver::new(registry);
        for list in lists {
            let Some(part) = store.partition(list.subdomain()) else {
                continue;
            };
            let contributions =
                accumulate(part, list, &resolver, registry, model, stage, time, &mut stats)?;
            if let Some(part) = store.partition_mut(list.subdomain()) {
                let (markers, ghosts) = part.split_mut();
                for (r, f) in contributions {
                    match r {
                        NeighborRef::Local(i) => *markers[i as usize].stage_force_mut(stage) += f,
                        NeighborRef::Ghost(i) => {
                            ghosts[i as usize].force += f;
                            stats.ghost_writes += 1;
                        }
                    }
                }
            }
        }
    }

    store.sum_neighbors(stage);
    apply_force_constraints(store, constraints, stage);

    stats.max_force = store
        .iter()
        .map(|m| m.stage_force(stage).length())
        .fold(0.0, f64::max);
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn accumulate(
    part: &Partition,
    list: &NeighborList,
    resolver: &ConnectivityResolver<'_>,
    registry: &FilamentRegistry,
    model: ForceModel,
    stage: Stage,
    time: f64,
    stats: &mut ForceStats,
) -> Result<Vec<(NeighborRef, Vec3)>, StepError> {
    let mut out = Vec::new();
    for (i, m) in part.markers().iter().enumerate() {
        let chain = resolver.find_connected(part, i, list, stage)?;
        stats.tie_breaks += chain.tie_breaks;
        // The resolver has already rejected unknown filaments.
        let Some(spec) = registry.get(m.filament) else {
            continue;
        };
        let me = NeighborRef::Local(i as u32);
        let r = m.stage_position(stage);

        if let Some(next) = chain.next.filter(|_| model.has_springs()) {
            let delta = part.view(next, stage).position - r;
            let f = spring_force(delta, spec.rest_length(), spec.spring_k);
            out.push((me, f));
            out.push((next, -f));
            stats.springs += 1;
        }

        if model.has_bending() && chain.position == ChainPosition::Interior {
            if let (Some(prev), Some(next)) = (chain.prev, chain.next) {
                let theta = target_angle(spec, time, m.sequence_index);
                let rot = bending_rotation(spec.bending_axis, theta);
                let t = bending_forces(
                    part.view(prev, stage).position,
                    r,
                    part.view(next, stage).position,
                    &rot,
                    spec.bending_k,
                );
                out.push((prev, t.prev));
                out.push((me, t.curr));
                out.push((next, t.next));
                stats.triplets += 1;
            }
        }
    }
    log::trace!(
        "subdomain {}: {} force contributions",
        part.id(),
        out.len()
    );
    Ok(out)
}
