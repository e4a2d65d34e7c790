//! The Lagrangian marker record.

use strand_core::{FilamentId, MarkerId, Vec3};

/// Which half of the predictor–corrector step a field access refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Predictor half: `pred_*` fields.
    Predictor,
    /// Corrector half: the committed fields.
    Corrector,
}

/// A point on an immersed filament.
///
/// The committed `position`/`velocity`/`force` fields describe the state
/// at the end of the last completed step (with `force` holding the
/// trapezoidal average once a step completes). The `pred_*` fields are
/// scratch for the predictor stage and are reset at the start of every
/// step.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Persistent unique id.
    pub id: MarkerId,
    /// Filament this marker belongs to.
    pub filament: FilamentId,
    /// Position along the filament, `0..N`.
    pub sequence_index: u32,
    /// Committed position.
    pub position: Vec3,
    /// Committed velocity.
    pub velocity: Vec3,
    /// Committed force.
    pub force: Vec3,
    /// Predictor-stage position.
    pub pred_position: Vec3,
    /// Predictor-stage velocity.
    pub pred_velocity: Vec3,
    /// Predictor-stage force.
    pub pred_force: Vec3,
}

impl Marker {
    /// A marker at rest at `position`.
    pub fn new(id: MarkerId, filament: FilamentId, sequence_index: u32, position: Vec3) -> Self {
        Self {
            id,
            filament,
            sequence_index,
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            pred_position: position,
            pred_velocity: Vec3::ZERO,
            pred_force: Vec3::ZERO,
        }
    }

    /// Position used by `stage`.
    #[inline]
    pub fn stage_position(&self, stage: Stage) -> Vec3 {
        match stage {
            Stage::Predictor => self.pred_position,
            Stage::Corrector => self.position,
        }
    }

    /// Velocity used by `stage`.
    #[inline]
    pub fn stage_velocity(&self, stage: Stage) -> Vec3 {
        match stage {
            Stage::Predictor => self.pred_velocity,
            Stage::Corrector => self.velocity,
        }
    }

    /// Mutable velocity slot of `stage`.
    #[inline]
    pub fn stage_velocity_mut(&mut self, stage: Stage) -> &mut Vec3 {
        match stage {
            Stage::Predictor => &mut self.pred_velocity,
            Stage::Corrector => &mut self.velocity,
        }
    }

    /// Force accumulated by `stage`.
    #[inline]
    pub fn stage_force(&self, stage: Stage) -> Vec3 {
        match stage {
            Stage::Predictor => self.pred_force,
            Stage::Corrector => self.force,
        }
    }

    /// Mutable force slot of `stage`.
    #[inline]
    pub fn stage_force_mut(&mut self, stage: Stage) -> &mut Vec3 {
        match stage {
            Stage::Predictor => &mut self.pred_force,
            Stage::Corrector => &mut self.force,
        }
    }

    /// Clear the slots `stage` is about to recompute.
    ///
    /// The predictor position restarts from the committed position so a
    /// stale value from the previous step is never read.
    pub fn reset_stage(&mut self, stage: Stage) {
        match stage {
            Stage::Predictor => {
                self.pred_position = self.position;
                self.pred_velocity = Vec3::ZERO;
                self.pred_force = Vec3::ZERO;
            }
            Stage::Corrector => {
                self.velocity = Vec3::ZERO;
                self.force = Vec3::ZERO;
            }
        }
    }
}
