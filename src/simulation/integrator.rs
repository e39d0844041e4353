//! Fixed-step time integrator for a scenario
//!
//! Semi-implicit Euler with a per-body effective step `dt * tg * te`.
//! The whole scenario advances Jacobi-style: every body reads the tick-start
//! snapshot, results are written to a fresh buffer, and the buffer replaces
//! the old bodies only after all of them are advanced.
//!
//! Bodies with [`Motion::Rotating`] are not integrated: they turn about the
//! anchor at a fixed radius on the raw global step.

use tracing::debug;

use super::events::detect;
use super::forces::accumulate;
use super::scenario::Scenario;
use super::states::{Body, Motion, NVec3};

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub tick: u64,      // tick count after this step
    pub skipped: usize, // pair contributions dropped as singular
    pub events: usize,  // bodies whose event fired
}

/// Advance `scenario` by one tick of global step `dt`
pub fn euler_integrator(scenario: &mut Scenario, dt: f64) -> StepReport {
    let n = scenario.len();
    if n == 0 {
        return StepReport::default();
    }

    let snapshot = scenario.bodies();
    let origin_before = snapshot[0].p;
    let mut skipped = 0;
    let mut next: Vec<Body> = Vec::with_capacity(n);

    for body in snapshot {
        let mut b = body.clone();
        b.o = b.p;
        b.v[1] = b.v[0];

        match b.motion() {
            Motion::Free => {
                let sums = accumulate(body, snapshot, &scenario.parameters);
                skipped += sums.skipped;

                b.tg = sums.tg(b.hg());
                b.te = sums.te(b.he());
                let dt_eff = dt * b.tg * b.te;

                // Kick then drift: v_n+1 = v_n + a dt, x_n+1 = x_n + v_n+1 dt
                b.force = sums.force;
                b.v[0] += sums.accel * dt_eff;
                b.p += b.v[0] * dt_eff;
                b.tau += dt_eff;
            }
            Motion::Rotating { omega } => {
                // the anchor is body 0, so its new position is already known
                let centre = next.first().map_or(origin_before, |anchor| anchor.p);
                rotate(&mut b, omega, dt, origin_before, centre);
            }
        }
        next.push(b);
    }

    let origin_after = next[0].p;
    let mut events = 0;
    for b in next.iter_mut() {
        let dt_eff = dt * b.tg * b.te;
        if detect(b, origin_before, origin_after, dt_eff) {
            events += 1;
        }
    }

    if skipped > 0 {
        debug!(scenario = %scenario.name, tick = scenario.tick, skipped, "skipped coincident pairs");
    }

    scenario.replace_bodies(next);
    scenario.t += dt;
    scenario.tick += 1;

    StepReport {
        tick: scenario.tick,
        skipped,
        events,
    }
}

/// Turn `b` about the anchor by `omega * dt`, keeping its radius and height
fn rotate(b: &mut Body, omega: f64, dt: f64, origin_before: NVec3, origin_after: NVec3) {
    let r = b.p - origin_before;
    let (s, c) = (omega * dt).sin_cos();
    let turned = NVec3::new(c * r.x - s * r.y, s * r.x + c * r.y, r.z);

    b.p = origin_after + turned;
    b.v[0] = NVec3::new(-omega * turned.y, omega * turned.x, 0.0);
    b.force = NVec3::zeros();
    b.tg = 1.0;
    b.te = 1.0;
    b.tau += dt;
}
