//! Projection constraints applied after every velocity and force update.

use strand_core::{Axis, MarkerId, Vec3};
use strand_markers::{MarkerStore, Stage};

/// A kinematic constraint enforced by zeroing, never validated.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// Zero one component of every marker's velocity and force, keeping
    /// the motion in the complementary plane.
    ZeroComponent(Axis),
    /// Hold one marker in place: its velocity is zeroed, its force is
    /// still transmitted to the fluid.
    PinMarker(MarkerId),
}

impl Constraint {
    /// Project a velocity of marker `id`.
    pub fn project_velocity(&self, id: MarkerId, v: &mut Vec3) {
        match self {
            Self::ZeroComponent(axis) => axis.set_component(v, 0.0),
            Self::PinMarker(pinned) if *pinned == id => *v = Vec3::ZERO,
            Self::PinMarker(_) => {}
        }
    }

    /// Project a force on marker `id`.
    pub fn project_force(&self, _id: MarkerId, f: &mut Vec3) {
        match self {
            Self::ZeroComponent(axis) => axis.set_component(f, 0.0),
            Self::PinMarker(_) => {}
        }
    }
}

/// Apply `constraints` to every owned marker's `stage` velocity.
pub fn apply_velocity_constraints(store: &mut MarkerStore, constraints: &[Constraint], stage: Stage) {
    if constraints.is_empty() {
        return;
    }
    for m in store.iter_mut() {
        let id = m.id;
        let v = m.stage_velocity_mut(stage);
        for c in constraints {
            c.project_velocity(id, v);
        }
    }
}

/// Apply `constraints` to every owned marker's `stage` force.
pub fn apply_force_constraints(store: &mut MarkerStore, constraints: &[Constraint], stage: Stage) {
    if constraints.is_empty() {
        return;
    }
    for m in store.iter_mut() {
        let id = m.id;
        let f = m.stage_force_mut(stage);
        for c in constraints {
            c.project_force(id, f);
        }
    }
}
