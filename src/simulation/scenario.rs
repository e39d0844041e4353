//! Build fully-initialized simulation scenarios
//!
//! Takes a `ScenarioConfig` (YAML-facing) or hand-built bodies and produces
//! the runtime bundle containing:
//! - numerical parameters (`Parameters`)
//! - the ordered bodies, anchor first, at t = 0
//! - the shared clock
//!
//! Construction validates everything that could make a run meaningless
//! (missing anchor mass, negative scales, non-finite state), so a scenario
//! that exists can always be stepped.

use tracing::debug;

use crate::configuration::config::{BodyConfig, EventConfig, LawConfig, ScenarioConfig};
use crate::error::{SimError, SimResult};
use crate::simulation::events::{EventKind, DEFAULT_PERIHELION_BAND};
use crate::simulation::laws::{PhysicalLaw, H_GRAVITY};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, Motion, NVec3};

/// Runtime bundle for one law variant: parameters, bodies and clock.
/// Body 0 is the dominant anchor. The body list is never resized.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub parameters: Parameters,
    bodies: Vec<Body>,
    pub t: f64,    // global time
    pub tick: u64, // completed ticks
}

impl Scenario {
    pub fn new(name: impl Into<String>, parameters: Parameters, bodies: Vec<Body>) -> SimResult<Self> {
        let name = name.into();
        parameters.validate()?;
        validate_bodies(&name, &bodies)?;
        Ok(Self {
            name,
            parameters,
            bodies,
            t: 0.0,
            tick: 0,
        })
    }

    pub fn build_scenario(cfg: &ScenarioConfig) -> SimResult<Self> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            g: p_cfg.g.unwrap_or(crate::simulation::laws::G),
            k: p_cfg.k.unwrap_or(crate::simulation::laws::K),
            dt: p_cfg.dt,
        };

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let bodies = cfg
            .bodies
            .iter()
            .map(build_body)
            .collect::<SimResult<Vec<Body>>>()?;

        debug!(scenario = %cfg.name, bodies = bodies.len(), "built scenario");
        Self::new(cfg.name.clone(), parameters, bodies)
    }

    /// Same initial conditions with every body bound to `law`.
    pub fn dual(&self, law: PhysicalLaw) -> SimResult<Self> {
        let bodies = self.bodies.iter().map(|b| b.dual(law)).collect();
        Self::new(format!("{}/{}", self.name, law.name()), self.parameters.clone(), bodies)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable view for consumers clearing event flags; the slice cannot grow
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn anchor(&self) -> &Body {
        &self.bodies[0]
    }

    pub(crate) fn replace_bodies(&mut self, next: Vec<Body>) {
        debug_assert_eq!(next.len(), self.bodies.len());
        self.bodies = next;
    }
}

fn build_body(bc: &BodyConfig) -> SimResult<Body> {
    let law = match bc.law {
        LawConfig::Newtonian => PhysicalLaw::Newtonian,
        LawConfig::FiniteTheory => PhysicalLaw::FiniteTheory,
    };
    let kind = match bc.event {
        EventConfig::None => EventKind::None,
        EventConfig::Perihelion { band } => EventKind::Perihelion {
            band: band.unwrap_or(DEFAULT_PERIHELION_BAND),
        },
        EventConfig::LightBending { threshold } => EventKind::LightBending { threshold },
        EventConfig::DomainCrossing { cell } => EventKind::DomainCrossing { cell },
        EventConfig::EveryTick => EventKind::EveryTick,
    };

    let mut body = Body::new(
        &bc.name,
        bc.m,
        bc.q,
        vec3(&bc.name, "position", &bc.x)?,
        vec3(&bc.name, "velocity", &bc.v)?,
        law,
        kind,
    )
    .with_scales(bc.hg.unwrap_or(H_GRAVITY), bc.he.unwrap_or(0.0));
    if let Some(omega) = bc.omega {
        body = body.with_motion(Motion::Rotating { omega });
    }
    if let Some(color) = bc.color {
        body = body.with_color(color);
    }
    Ok(body)
}

fn vec3(name: &str, field: &'static str, xs: &[f64]) -> SimResult<NVec3> {
    match xs {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        [x, y] => Ok(NVec3::new(*x, *y, 0.0)),
        _ => Err(SimError::BadVector {
            name: name.to_string(),
            field,
            len: xs.len(),
        }),
    }
}

fn validate_bodies(scenario: &str, bodies: &[Body]) -> SimResult<()> {
    let anchor = bodies
        .first()
        .ok_or_else(|| SimError::EmptyScenario(scenario.to_string()))?;
    if !(anchor.mass().is_finite() && anchor.mass() > 0.0) {
        return Err(SimError::InvalidAnchorMass {
            name: anchor.name().to_string(),
            mass: anchor.mass(),
        });
    }

    for b in bodies {
        let name = || b.name().to_string();

        let finite = [
            ("mass", b.mass().is_finite()),
            ("charge", b.charge().is_finite()),
            ("position", b.p.iter().all(|x| x.is_finite())),
            ("velocity", b.v[0].iter().all(|x| x.is_finite())),
            ("hg", b.hg().is_finite()),
            ("he", b.he().is_finite()),
            (
                "omega",
                match b.motion() {
                    Motion::Rotating { omega } => omega.is_finite(),
                    Motion::Free => true,
                },
            ),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, ok)| !ok) {
            return Err(SimError::NonFinite { name: name(), field: *field });
        }

        for (field, value) in [("mass", b.mass()), ("hg", b.hg()), ("he", b.he())] {
            if value < 0.0 {
                return Err(SimError::NegativeScale { name: name(), field, value });
            }
        }

        if b.law() == PhysicalLaw::FiniteTheory && b.hg() <= 0.0 {
            return Err(SimError::MissingGravityScale { name: name() });
        }

        let bad_event = match b.kind() {
            EventKind::Perihelion { band } if !(band.is_finite() && band >= 0.0) => Some(("band", band)),
            EventKind::LightBending { threshold } if !threshold.is_finite() => Some(("threshold", threshold)),
            EventKind::DomainCrossing { cell } if !(cell.is_finite() && cell > 0.0) => Some(("cell", cell)),
            _ => None,
        };
        if let Some((field, value)) = bad_event {
            return Err(SimError::InvalidEvent { name: name(), field, value });
        }
    }
    Ok(())
}
