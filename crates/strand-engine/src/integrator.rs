//! The two-stage predictor-corrector integrator.
//!
//! [`Integrator`] owns the marker store, the filament registry and the
//! external collaborators (viscous solver, explicit fluid operators,
//! domain decomposition). The caller owns the [`FluidState`] and passes
//! it to [`step()`](Integrator::step), which commits a new fluid state
//! only after both stages succeed.

use std::time::Instant;

use strand_core::{
    DomainDecomposition, EulerianFieldStore, FluidOperator, GridGeometry, SolveOutcome,
    SolverError, StepError, StepId, StokesSolver,
};
use strand_coupling::{interpolate_markers, spread_markers};
use strand_forces::{apply_velocity_constraints, compute_forces, ForceStats};
use strand_grid::{CellField, FaceField};
use strand_markers::{
    FilamentRegistry, Marker, MarkerStore, NeighborIndex, NeighborList, Stage,
};

use crate::config::{ConfigError, IntegratorConfig};
use crate::fluid::{ExternalForcing, FluidState, Scratch};
use crate::metrics::{StepMetrics, StepReport};

fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

/// Heun predictor-corrector coupling of immersed filaments to a
/// viscous fluid.
///
/// Generic over the viscous solver `S`, the explicit fluid operators
/// `O` and the spatial decomposition `D`. A step that fails for any
/// reason other than a bad argument leaves the marker state partially
/// advanced; the integrator is then poisoned and refuses further steps
/// until [`restore()`](Self::restore) installs a trusted state.
pub struct Integrator<S, O, D> {
    config: IntegratorConfig,
    geometry: GridGeometry,
    registry: FilamentRegistry,
    decomp: D,
    solver: S,
    fluid_op: O,
    store: MarkerStore,
    index: NeighborIndex,
    step_id: StepId,
    time: f64,
    forcing: Option<ExternalForcing>,
    scratch: Option<Scratch>,
    last_metrics: StepMetrics,
    poisoned: bool,
}

impl<S, O, D> Integrator<S, O, D>
where
    S: StokesSolver<Velocity = FaceField, Pressure = CellField>,
    O: FluidOperator<Velocity = FaceField, Pressure = CellField>,
    D: DomainDecomposition,
{
    // ── Construction ───────────────────────────────────────────────

    /// Validate `config`, seed every filament straight from its origin
    /// (wrapped into the periodic domain) and distribute the markers
    /// over `decomp`.
    pub fn new(
        config: IntegratorConfig,
        geometry: GridGeometry,
        decomp: D,
        solver: S,
        fluid_op: O,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let max = decomp.max_ghost_cutoff();
        if config.cutoff > max {
            return Err(ConfigError::CutoffExceedsGhostLayer {
                cutoff: config.cutoff,
                max,
            });
        }
        let registry = config.registry()?;
        let markers = registry
            .seed_all()
            .into_iter()
            .map(|m| wrapped(&geometry, m));
        let store = MarkerStore::from_markers(markers, &decomp)?;
        log::debug!(
            "integrator: {} filaments, {} markers over {} subdomains, dt = {}, cutoff = {}",
            registry.len(),
            store.len(),
            decomp.subdomain_count(),
            config.dt,
            config.cutoff
        );

        Ok(Self {
            index: NeighborIndex::new(config.cutoff),
            config,
            geometry,
            registry,
            decomp,
            solver,
            fluid_op,
            store,
            step_id: StepId(0),
            time: 0.0,
            forcing: None,
            scratch: None,
            last_metrics: StepMetrics::default(),
            poisoned: false,
        })
    }

    /// Replace the marker state, step counter and time, e.g. from a
    /// restart snapshot. Clears a poisoned state.
    ///
    /// Positions are wrapped into the domain and markers are handed to
    /// the subdomains containing them; every filament must be complete.
    pub fn restore(
        &mut self,
        markers: impl IntoIterator<Item = Marker>,
        step: StepId,
        time: f64,
    ) -> Result<(), StepError> {
        let geometry = &self.geometry;
        let store =
            MarkerStore::from_markers(markers.into_iter().map(|m| wrapped(geometry, m)), &self.decomp)?;
        store.check_sequences(&self.registry)?;
        log::debug!("restored {} markers at step {step}, t = {time}", store.len());
        self.store = store;
        self.step_id = step;
        self.time = time;
        self.poisoned = false;
        Ok(())
    }

    /// Install (or clear) the momentum-flux divergences added to each
    /// stage's right-hand side.
    pub fn set_external_forcing(
        &mut self,
        forcing: Option<ExternalForcing>,
    ) -> Result<(), StepError> {
        if let Some(f) = &forcing {
            if f.geometry() != &self.geometry || f.corrector.geometry() != &self.geometry {
                return Err(SolverError::GeometryMismatch {
                    reason: "external forcing lives on a different grid".into(),
                }
                .into());
            }
        }
        self.forcing = forcing;
        Ok(())
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Advance markers and `fluid` by one `dt`.
    ///
    /// A non-converged solve is logged and reported in the returned
    /// [`StepReport`]; it is not an error. Any error leaves `fluid`
    /// untouched. Errors other than a grid mismatch poison the
    /// integrator.
    pub fn step(&mut self, fluid: &mut FluidState) -> Result<StepReport, StepError> {
        if self.poisoned {
            return Err(StepError::Poisoned);
        }
        if fluid.geometry() != &self.geometry || fluid.pressure.geometry() != &self.geometry {
            return Err(SolverError::GeometryMismatch {
                reason: "fluid state lives on a different grid".into(),
            }
            .into());
        }

        let mut scratch = match self.scratch.take() {
            Some(s) if s.fits(&self.geometry) => s,
            _ => Scratch::new(&self.geometry),
        };
        let result = self.advance(fluid, &mut scratch);
        self.scratch = Some(scratch);

        match result {
            Ok(report) => {
                self.last_metrics = report.metrics.clone();
                Ok(report)
            }
            Err(e) => {
                self.poisoned = true;
                log::error!("step {} failed at t = {}: {e}", self.step_id.next(), self.time);
                Err(e)
            }
        }
    }

    fn advance(
        &mut self,
        fluid: &mut FluidState,
        s: &mut Scratch,
    ) -> Result<StepReport, StepError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();

        let dt = self.config.dt;
        let density = self.config.density;
        let kernel = self.config.kernel;
        let halo = kernel.halo_width();
        let coeffs = self.config.viscosity();
        let implicit = coeffs.implicit_half();
        let explicit = coeffs.explicit_half();

        // ── Predictor ──────────────────────────────────────────────

        for m in self.store.iter_mut() {
            m.reset_stage(Stage::Predictor);
        }

        let t = Instant::now();
        fluid.velocity.fill_boundary(halo);
        interpolate_markers(&fluid.velocity, kernel, &mut self.store, Stage::Predictor);
        metrics.interpolate_us += micros(t);

        apply_velocity_constraints(&mut self.store, &self.config.constraints, Stage::Predictor);
        for m in self.store.iter_mut() {
            m.pred_position = self.geometry.wrap_position(m.position + dt * m.pred_velocity);
        }

        let pred_forces = self.markers_stage(Stage::Predictor, &mut metrics)?;
        log::debug!(
            "predictor: {} springs, {} triplets, max |f| = {:.4e}",
            pred_forces.springs,
            pred_forces.triplets,
            pred_forces.max_force
        );

        let t = Instant::now();
        // ρu/dt + L(u)/2 + ρA(u)
        s.rhs_velocity.copy_from(&fluid.velocity);
        s.rhs_velocity.scale(coeffs.alpha);
        self.fluid_op.apply_viscous(&fluid.velocity, &explicit, &mut s.work);
        s.rhs_velocity.axpy(1.0, &s.work);
        self.fluid_op.advective_flux_divergence(&fluid.velocity, &mut s.advection);
        s.rhs_velocity.axpy(density, &s.advection);
        // S f*
        s.work.fill(0.0);
        spread_markers(&mut s.work, kernel, &self.store, Stage::Predictor);
        s.rhs_velocity.axpy(1.0, &s.work);
        if let Some(f) = &self.forcing {
            s.rhs_velocity.axpy(1.0, &f.predictor);
        }
        self.pressure_guess(fluid, s, Stage::Predictor);
        s.rhs_pressure.fill(0.0);
        s.pred_velocity.copy_from(&fluid.velocity);
        metrics.spread_us += micros(t);

        let t = Instant::now();
        let predictor = self.solver.solve(
            &s.rhs_velocity,
            &s.rhs_pressure,
            &mut s.pred_velocity,
            &mut s.pred_pressure,
            &implicit,
        )?;
        metrics.solve_us += micros(t);
        self.report_solve("predictor", &predictor);

        // ── Corrector ──────────────────────────────────────────────

        for m in self.store.iter_mut() {
            m.reset_stage(Stage::Corrector);
        }

        let t = Instant::now();
        s.pred_velocity.fill_boundary(halo);
        interpolate_markers(&s.pred_velocity, kernel, &mut self.store, Stage::Corrector);
        metrics.interpolate_us += micros(t);

        apply_velocity_constraints(&mut self.store, &self.config.constraints, Stage::Corrector);
        for m in self.store.iter_mut() {
            m.position = self.geometry.wrap_position(m.position + dt * m.velocity);
        }

        let forces = self.markers_stage(Stage::Corrector, &mut metrics)?;
        metrics.max_force = forces.max_force;
        for m in self.store.iter_mut() {
            m.force = 0.5 * (m.force + m.pred_force);
        }

        let t = Instant::now();
        // ρu/dt + L(u)/2 + ½ρA(u) + ½ρA(u*)
        s.rhs_velocity.copy_from(&fluid.velocity);
        s.rhs_velocity.scale(coeffs.alpha);
        self.fluid_op.apply_viscous(&fluid.velocity, &explicit, &mut s.work);
        s.rhs_velocity.axpy(1.0, &s.work);
        s.rhs_velocity.axpy(0.5 * density, &s.advection);
        self.fluid_op.advective_flux_divergence(&s.pred_velocity, &mut s.work);
        s.rhs_velocity.axpy(0.5 * density, &s.work);
        // S f̄
        s.work.fill(0.0);
        spread_markers(&mut s.work, kernel, &self.store, Stage::Corrector);
        s.rhs_velocity.axpy(1.0, &s.work);
        if let Some(f) = &self.forcing {
            s.rhs_velocity.axpy(1.0, &f.corrector);
        }
        self.pressure_guess(fluid, s, Stage::Corrector);
        s.rhs_pressure.fill(0.0);
        s.velocity.copy_from(&s.pred_velocity);
        metrics.spread_us += micros(t);

        let t = Instant::now();
        let corrector = self.solver.solve(
            &s.rhs_velocity,
            &s.rhs_pressure,
            &mut s.velocity,
            &mut s.pressure,
            &implicit,
        )?;
        metrics.solve_us += micros(t);
        self.report_solve("corrector", &corrector);

        // ── Commit ─────────────────────────────────────────────────

        std::mem::swap(&mut fluid.velocity, &mut s.velocity);
        std::mem::swap(&mut fluid.pressure, &mut s.pressure);
        self.step_id = self.step_id.next();
        self.time += dt;
        metrics.total_us = micros(start);

        Ok(StepReport {
            step: self.step_id,
            time: self.time,
            metrics,
            predictor,
            corrector,
        })
    }

    /// Redistribute, exchange ghosts, rebuild neighbour lists and run
    /// the force pass for `stage`. Actuation uses the step-start time.
    fn markers_stage(
        &mut self,
        stage: Stage,
        metrics: &mut StepMetrics,
    ) -> Result<ForceStats, StepError> {
        let t = Instant::now();
        let moved = self.store.redistribute(&self.decomp, stage)?;
        if self.config.check_invariants {
            self.store.check_sequences(&self.registry)?;
        }
        let ghosts = self
            .store
            .exchange_ghosts(&self.decomp, self.config.cutoff, stage);
        metrics.redistribute_us += micros(t);
        metrics.migrated += moved.migrated;
        metrics.ghosts = ghosts;
        log::debug!(
            "{stage:?}: {} migrated, {ghosts} ghosts",
            moved.migrated
        );

        let t = Instant::now();
        let lists = self.index.build_all(&self.store, stage);
        metrics.neighbor_us += micros(t);
        metrics.neighbor_pairs = lists.iter().map(NeighborList::pair_count).sum();

        let t = Instant::now();
        let stats = compute_forces(
            &mut self.store,
            &lists,
            &self.registry,
            self.config.force_model,
            &self.config.constraints,
            stage,
            self.time,
        )?;
        metrics.force_us += micros(t);
        metrics.tie_breaks += stats.tie_breaks;
        Ok(stats)
    }

    /// Seed the stage's pressure guess and subtract its gradient from
    /// the right-hand side when pressure reuse is on.
    fn pressure_guess(&self, fluid: &FluidState, s: &mut Scratch, stage: Stage) {
        let guess = match stage {
            Stage::Predictor => &mut s.pred_pressure,
            Stage::Corrector => &mut s.pressure,
        };
        if self.config.reuse_pressure {
            guess.data_mut().copy_from_slice(fluid.pressure.data());
            self.fluid_op.pressure_gradient(&fluid.pressure, &mut s.work);
            s.rhs_velocity.axpy(-1.0, &s.work);
        } else {
            guess.fill(0.0);
        }
    }

    fn report_solve(&self, stage: &str, outcome: &SolveOutcome) {
        if outcome.converged {
            log::trace!(
                "{stage} solve: residual {:.3e} after {} iterations",
                outcome.residual_norm,
                outcome.iterations
            );
        } else {
            log::warn!(
                "step {}: {stage} solve did not converge (residual {:.3e} after {} iterations)",
                self.step_id.next(),
                outcome.residual_norm,
                outcome.iterations
            );
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Marker store.
    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    /// Filament registry.
    pub fn registry(&self) -> &FilamentRegistry {
        &self.registry
    }

    /// Configuration the integrator was built with.
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Grid the fluid lives on.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Domain decomposition.
    pub fn decomposition(&self) -> &D {
        &self.decomp
    }

    /// Viscous solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Viscous solver, mutably (e.g. to retune tolerances between steps).
    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Whether a failed step has left the marker state untrusted.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

fn wrapped(geometry: &GridGeometry, mut m: Marker) -> Marker {
    m.position = geometry.wrap_position(m.position);
    m.pred_position = m.position;
    m
}
