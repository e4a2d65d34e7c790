//! Drive a single actuated flagellum in a periodic box and log each step.
//!
//! ```sh
//! RUST_LOG=info cargo run -p strand-engine --example flagellum
//! ```

use strand_core::{Axis, Vec3};
use strand_engine::{FluidState, Integrator, IntegratorConfig};
use strand_forces::Constraint;
use strand_grid::BlockDecomposition;
use strand_test_utils::{flagellum_spec, unit_box, PeriodicStokes};

const STEPS: u64 = 20;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let geometry = unit_box(16);
    let decomp = BlockDecomposition::new(&geometry, [2, 2, 1]).ok_or("bad block layout")?;
    let config = IntegratorConfig {
        constraints: vec![Constraint::ZeroComponent(Axis::Z)],
        filaments: vec![flagellum_spec(Vec3::new(0.25, 0.5, 0.5))],
        ..IntegratorConfig::default()
    };
    let mut fluid = FluidState::at_rest(&geometry);
    let mut engine = Integrator::new(
        config,
        geometry,
        decomp,
        PeriodicStokes::default(),
        PeriodicStokes::default(),
    )?;

    for _ in 0..STEPS {
        let report = engine.step(&mut fluid)?;
        let m = &report.metrics;
        log::info!(
            "step {} t={:.2e} total={}us solve={}us migrated={} ghosts={} max|f|={:.3e} converged={}",
            report.step,
            report.time,
            m.total_us,
            m.solve_us,
            m.migrated,
            m.ghosts,
            m.max_force,
            report.converged(),
        );
    }

    let tip = engine
        .store()
        .iter()
        .max_by_key(|m| m.sequence_index)
        .map(|m| m.position)
        .unwrap_or_default();
    println!(
        "{} steps, t = {:.3e}, tip at ({:.5}, {:.5}, {:.5}), max |u| = {:.3e}",
        STEPS,
        engine.time(),
        tip.x,
        tip.y,
        tip.z,
        fluid.velocity.max_abs(),
    );
    Ok(())
}
