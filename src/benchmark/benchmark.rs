use std::time::Instant;

use crate::error::SimResult;
use crate::simulation::events::EventKind;
use crate::simulation::integrator::euler_integrator;
use crate::simulation::laws::PhysicalLaw;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Body, NVec3};

/// Compare per-step cost of the two laws over a range of body counts
pub fn bench_step() -> SimResult<()> {
    let ns = [50, 100, 200, 400, 800];
    let steps = 5; // number of integrator steps per law (tune as needed)

    for n in ns {
        let newtonian = make_scenario(n, PhysicalLaw::Newtonian)?;
        let finite = newtonian.dual(PhysicalLaw::FiniteTheory)?;

        let newton_per_step = time_steps(newtonian, steps);
        let finite_per_step = time_steps(finite, steps);

        println!(
            "N = {:5}, newtonian step = {:8.6} s,   finite-theory step = {:8.6} s",
            n, newton_per_step, finite_per_step
        );
    }
    Ok(())
}

/// Per-step cost for every N in steps of 50
/// Paste output directly into a spreadsheet to graph
pub fn bench_step_curve() -> SimResult<()> {
    println!("N,newtonian_ms,finite_ms");

    for n in (50..=1000).step_by(50) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 400 { 5 } else { 1 };

        let newtonian = make_scenario(n, PhysicalLaw::Newtonian)?;
        let finite = newtonian.dual(PhysicalLaw::FiniteTheory)?;

        let ms_newton = time_steps(newtonian, steps) * 1000.0;
        let ms_finite = time_steps(finite, steps) * 1000.0;

        println!("{},{:.6},{:.6}", n, ms_newton, ms_finite);
    }
    Ok(())
}

fn time_steps(mut scenario: Scenario, steps: usize) -> f64 {
    let dt = scenario.parameters.dt;

    // Warm up
    euler_integrator(&mut scenario, dt);

    let t0 = Instant::now();
    for _ in 0..steps {
        euler_integrator(&mut scenario, dt);
    }
    t0.elapsed().as_secs_f64() / steps as f64
}

/// Helper to build a scenario of `n` unit masses
fn make_scenario(n: usize, law: PhysicalLaw) -> SimResult<Scenario> {
    let bodies = (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(&format!("b{i}"), 1.0, 0.0, x, NVec3::zeros(), law, EventKind::None).with_scales(10.0, 0.0)
        })
        .collect();

    let parameters = Parameters {
        g: 0.1,
        k: 0.0,
        dt: 0.001,
    };
    Scenario::new(format!("bench-{n}"), parameters, bodies)
}
