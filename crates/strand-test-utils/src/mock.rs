//! Recording mock of the viscous solve.

use strand_core::{EulerianFieldStore, SolveOutcome, SolverError, StokesSolver, ViscosityCoeffs};
use strand_grid::{CellField, FaceField};

/// One recorded call to [`RecordingSolver::solve`].
#[derive(Clone, Debug)]
pub struct SolveCall {
    pub rhs: FaceField,
    pub coeffs: ViscosityCoeffs,
}

/// Solver mock that records its inputs and answers `u = rhs / alpha`
/// (the exact solution when viscosity is zero).
///
/// The reported outcome and an optional hard failure are configurable.
#[derive(Clone, Debug)]
pub struct RecordingSolver {
    pub calls: Vec<SolveCall>,
    pub outcome: SolveOutcome,
    pub fail_on_call: Option<(usize, SolverError)>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            outcome: SolveOutcome {
                residual_norm: 0.0,
                converged: true,
                iterations: 1,
            },
            fail_on_call: None,
        }
    }

    /// Report `residual_norm` as a non-converged solve on every call.
    pub fn non_converging(residual_norm: f64) -> Self {
        Self {
            outcome: SolveOutcome {
                residual_norm,
                converged: false,
                iterations: 100,
            },
            ..Self::new()
        }
    }

    /// Fail with `error` on call number `call` (0-based).
    pub fn failing_on(call: usize, error: SolverError) -> Self {
        Self {
            fail_on_call: Some((call, error)),
            ..Self::new()
        }
    }
}

impl Default for RecordingSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StokesSolver for RecordingSolver {
    type Velocity = FaceField;
    type Pressure = CellField;

    fn solve(
        &mut self,
        rhs_velocity: &FaceField,
        _rhs_pressure: &CellField,
        velocity: &mut FaceField,
        pressure: &mut CellField,
        coeffs: &ViscosityCoeffs,
    ) -> Result<SolveOutcome, SolverError> {
        let n = self.calls.len();
        self.calls.push(SolveCall {
            rhs: rhs_velocity.clone(),
            coeffs: *coeffs,
        });
        if let Some((call, err)) = &self.fail_on_call {
            if *call == n {
                return Err(err.clone());
            }
        }
        velocity.copy_from(rhs_velocity);
        if coeffs.alpha != 0.0 {
            velocity.scale(1.0 / coeffs.alpha);
        }
        velocity.apply_physical_bc();
        pressure.fill(0.0);
        Ok(self.outcome)
    }
}
