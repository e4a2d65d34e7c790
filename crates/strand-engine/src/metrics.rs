//! Per-step performance and diagnostic metrics.
//!
//! [`StepMetrics`] captures timing and counter data for a single
//! predictor-corrector step. All durations are in microseconds.

use strand_core::{SolveOutcome, StepId};

/// Timing and counter metrics collected during one step.
///
/// Timings sum both stages. Counters are taken from the corrector stage
/// unless stated otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole step, in microseconds.
    pub total_us: u64,
    /// Time spent interpolating fluid velocity to markers, in microseconds.
    pub interpolate_us: u64,
    /// Time spent redistributing markers and exchanging ghosts, in microseconds.
    pub redistribute_us: u64,
    /// Time spent building neighbour lists, in microseconds.
    pub neighbor_us: u64,
    /// Time spent in the force pass, in microseconds.
    pub force_us: u64,
    /// Time spent spreading forces and assembling the right-hand side, in microseconds.
    pub spread_us: u64,
    /// Time spent inside the viscous solver, in microseconds.
    pub solve_us: u64,
    /// Markers that changed owner, summed over both redistributions.
    pub migrated: usize,
    /// Ghost copies held after the corrector exchange.
    pub ghosts: usize,
    /// Directed neighbour pairs in the corrector lists.
    pub neighbor_pairs: usize,
    /// Connectivity lookups settled by distance, both stages.
    pub tie_breaks: u32,
    /// Largest corrector-stage marker force magnitude before averaging.
    pub max_force: f64,
}

/// What [`Integrator::step`](crate::Integrator::step) returns on success.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Step number after the commit.
    pub step: StepId,
    /// Simulation time after the commit.
    pub time: f64,
    /// Metrics for this step.
    pub metrics: StepMetrics,
    /// Predictor solve outcome.
    pub predictor: SolveOutcome,
    /// Corrector solve outcome.
    pub corrector: SolveOutcome,
}

impl StepReport {
    /// Whether both solves met their tolerance.
    pub fn converged(&self) -> bool {
        self.predictor.converged && self.corrector.converged
    }
}
