//! Per-body event detection
//!
//! Runs at the tail of every integrator tick on the freshly advanced body.
//! Each body declares one [`EventKind`]; when its geometric test passes, the
//! measured quantities are latched into `body.event` and `body.updated` is
//! raised. The latch holds at most one pending event: a newer event simply
//! overwrites an unconsumed one.

use std::f64::consts::PI;

use super::states::{Body, NVec3};

/// Relative band used when none is configured for perihelion detection
pub const DEFAULT_PERIHELION_BAND: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// No detection, history is still recorded
    None,
    /// Local radial minimum around the anchor. `band` is the relative margin
    /// the outer history samples must clear, so floating-point jitter on a
    /// circular orbit never registers as a minimum.
    Perihelion { band: f64 },
    /// Single crossing of `x = threshold` relative to the anchor
    LightBending { threshold: f64 },
    /// Change of `floor(x / cell)` in absolute coordinates
    DomainCrossing { cell: f64 },
    /// Every tick
    EveryTick,
}

/// One history slot: position relative to the anchor plus its spherical form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: NVec3,
    pub radius: f64,
    pub azimuth: f64,
    pub polar: f64,
}

impl Sample {
    pub fn from_relative(position: NVec3) -> Self {
        let radius = position.norm();
        let azimuth = position.y.atan2(position.x);
        let polar = if radius > 0.0 {
            (position.z / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        Self {
            position,
            radius,
            azimuth,
            polar,
        }
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::from_relative(NVec3::zeros())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Perihelion {
        previous: Option<Sample>,
        current: Sample,
    },
    LightBending {
        before: NVec3,
        after: NVec3,
    },
    DomainCrossing {
        cell: i64,
        velocity: NVec3,
    },
    Tick {
        position: NVec3,
        velocity: NVec3,
        dt_eff: f64,
    },
}

impl Event {
    /// Quantity compared between law variants.
    ///
    /// - perihelion: (azimuth advance, radius change, polar change) between
    ///   the two latched perihelia; `None` until two have been seen
    /// - light bending: (direction angle in xy, elevation, y at crossing)
    /// - domain crossing and every-tick: velocity
    pub fn measurement(&self) -> Option<NVec3> {
        match self {
            Event::Perihelion { previous, current } => previous.map(|prev| {
                NVec3::new(
                    wrap_angle(current.azimuth - prev.azimuth),
                    current.radius - prev.radius,
                    current.polar - prev.polar,
                )
            }),
            Event::LightBending { before, after } => {
                let dir = after - before;
                let len = dir.norm();
                if len == 0.0 {
                    return None;
                }
                Some(NVec3::new(
                    dir.y.atan2(dir.x),
                    (dir.z / len).clamp(-1.0, 1.0).asin(),
                    after.y,
                ))
            }
            Event::DomainCrossing { velocity, .. } => Some(*velocity),
            Event::Tick { velocity, .. } => Some(*velocity),
        }
    }
}

/// Wrap an angle into (-pi, pi]
pub fn wrap_angle(a: f64) -> f64 {
    let mut w = a % (2.0 * PI);
    if w <= -PI {
        w += 2.0 * PI;
    } else if w > PI {
        w -= 2.0 * PI;
    }
    w
}

/// Update `body`'s history after it has been advanced and run its test.
///
/// `origin_before` / `origin_after` are the anchor positions at the start and
/// end of the tick; `body.o` must already hold the tick-start position.
/// Returns true when an event fired.
pub fn detect(body: &mut Body, origin_before: NVec3, origin_after: NVec3, dt_eff: f64) -> bool {
    if body.first {
        // seed every slot with the pre-step sample
        body.ps = [Sample::from_relative(body.o - origin_before); 5];
        body.first = false;
    }
    body.ps.rotate_left(1);
    body.ps[4] = Sample::from_relative(body.p - origin_after);

    let fired = match body.kind() {
        EventKind::None => None,
        EventKind::Perihelion { band } => perihelion(body, band),
        EventKind::LightBending { threshold } => light_bending(body, threshold),
        EventKind::DomainCrossing { cell } => domain_crossing(body, cell),
        EventKind::EveryTick => Some(Event::Tick {
            position: body.p,
            velocity: body.v[0],
            dt_eff,
        }),
    };

    match fired {
        Some(event) => {
            body.event = Some(event);
            body.updated = true;
            true
        }
        None => false,
    }
}

fn perihelion(body: &mut Body, band: f64) -> Option<Event> {
    let r: [f64; 5] = [
        body.ps[0].radius,
        body.ps[1].radius,
        body.ps[2].radius,
        body.ps[3].radius,
        body.ps[4].radius,
    ];
    let margin = band * r[2];
    // `<=` on the left so a minimum split evenly between two samples is
    // reported once, on the later one
    let is_minimum = r[2] <= r[1] && r[2] < r[3] && r[0] - r[2] > margin && r[4] - r[2] > margin;
    if !is_minimum {
        return None;
    }

    body.pp[0] = body.pp[1];
    body.pp[1] = Some(body.ps[2]);
    Some(Event::Perihelion {
        previous: body.pp[0],
        current: body.ps[2],
    })
}

fn light_bending(body: &mut Body, threshold: f64) -> Option<Event> {
    if body.pp[1].is_some() {
        return None;
    }
    let before = body.ps[3];
    let after = body.ps[4];
    let crossed = (before.position.x < threshold && after.position.x >= threshold)
        || (before.position.x > threshold && after.position.x <= threshold);
    if !crossed {
        return None;
    }

    body.pp = [Some(before), Some(after)];
    Some(Event::LightBending {
        before: before.position,
        after: after.position,
    })
}

fn domain_crossing(body: &mut Body, cell: f64) -> Option<Event> {
    let was = (body.o.x / cell).floor() as i64;
    let now = (body.p.x / cell).floor() as i64;
    if was == now {
        return None;
    }
    Some(Event::DomainCrossing {
        cell: now,
        velocity: body.v[0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_stays_in_half_open_range() {
        assert!((wrap_angle(3.0 * PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(2.0 * PI + 0.1) - 0.1).abs() < 1e-12);
        assert!((wrap_angle(-0.1) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn sample_of_origin_is_finite() {
        let s = Sample::default();
        assert_eq!(s.radius, 0.0);
        assert_eq!(s.polar, 0.0);
        assert!(s.azimuth.is_finite());
    }
}
