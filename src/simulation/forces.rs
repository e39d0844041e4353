//! Interaction sums for the engine
//!
//! For one target body, walks every other body of the tick-start snapshot and
//! accumulates:
//! - net force (gravity along -d, electric along +d for like charges)
//! - acceleration (gravity through a unit probe mass, so massless bodies
//!   still fall; electric only for massive bodies)
//! - the raw dilation sums for gravity and charge
//!
//! Coincident pairs are skipped instead of producing infinities.

use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

/// Separations at or below this are treated as coincident
pub const MIN_SEPARATION: f64 = 1e-9;

/// Accumulated contributions on one body for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub force: NVec3,
    pub accel: NVec3,
    pub tg_sum: f64, // sum of gravity dilation terms
    pub te_sum: f64, // sum of charge dilation terms
    pub skipped: usize,
}

impl Interaction {
    fn zero() -> Self {
        Self {
            force: NVec3::zeros(),
            accel: NVec3::zeros(),
            tg_sum: 0.0,
            te_sum: 0.0,
            skipped: 0,
        }
    }

    /// Gravity dilation factor, hg / (sum + hg). Neutral without a scale.
    pub fn tg(&self, hg: f64) -> f64 {
        normalise(self.tg_sum, hg)
    }

    /// Charge dilation factor, he / (sum + he). Neutral without a scale.
    pub fn te(&self, he: f64) -> f64 {
        normalise(self.te_sum, he)
    }
}

fn normalise(sum: f64, scale: f64) -> f64 {
    let denom = sum + scale;
    if scale <= 0.0 || denom <= 0.0 || !denom.is_finite() {
        return 1.0;
    }
    scale / denom
}

/// Sum the contributions of every body in `snapshot` on `target`.
/// The target itself is recognised by id, never by position or mass.
pub fn accumulate(target: &Body, snapshot: &[Body], params: &Parameters) -> Interaction {
    let law = target.law();
    let mut out = Interaction::zero();

    for other in snapshot {
        if other.id() == target.id() {
            continue;
        }

        // d points from the source to the target
        let d = target.p - other.p;
        let dist = d.norm();
        if !(dist.is_finite() && dist > MIN_SEPARATION) {
            out.skipped += 1;
            continue;
        }
        let dir = d / dist;

        // Gravity: pull toward the source
        let f_grav = law.force(params.g, other.mass(), target.mass(), dist, target.hg());
        let a_grav = law.force(params.g, other.mass(), 1.0, dist, target.hg());
        let tg = law.dilation(other.mass(), dist);

        // Electric: like charges repel
        let f_elec = if other.charge() != 0.0 && target.charge() != 0.0 {
            law.force(params.k, other.charge(), target.charge(), dist, target.he())
        } else {
            0.0
        };
        let te = law.dilation(other.charge(), dist);

        if !(f_grav.is_finite() && a_grav.is_finite() && f_elec.is_finite() && tg.is_finite() && te.is_finite()) {
            out.skipped += 1;
            continue;
        }

        out.force += dir * (f_elec - f_grav);
        out.accel -= dir * a_grav;
        if target.mass() > 0.0 {
            out.accel += dir * (f_elec / target.mass());
        }
        out.tg_sum += tg;
        out.te_sum += te;
    }

    out
}
