//! Core state types for the simulation.
//!
//! Defines the body struct shared by both physical laws:
//! - identity and physical constants (private, fixed at construction)
//! - kinematic state and per-tick intermediates (public, mutated by stepping)
//! - event history and latch
//!
//! A scenario holds the list of bodies and the shared clock, see
//! [`crate::simulation::scenario::Scenario`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::events::{Event, EventKind, Sample};
use super::laws::PhysicalLaw;

pub type NVec3 = Vector3<f64>;

/// Display colour handed to whatever draws the bodies
pub type Color = [u8; 3];

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// How a body's position advances each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Integrated from the net force
    Free,
    /// Prescribed circular motion about the anchor at a fixed radius:
    /// the azimuth advances by `omega * dt` per tick, forces are ignored
    Rotating { omega: f64 },
}

/// Stable body identity, unique per construction within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl BodyId {
    fn next() -> Self {
        BodyId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    name: Arc<str>,
    mass: f64,
    charge: f64,
    hg: f64, // gravity scale
    he: f64, // charge scale
    law: PhysicalLaw,
    kind: EventKind,
    motion: Motion,

    pub color: Color,
    pub p: NVec3,      // position
    pub v: [NVec3; 2], // velocity: [current, previous tick]
    pub o: NVec3,      // position at the start of the last tick

    pub force: NVec3, // net force of the last tick
    pub tg: f64,      // gravity dilation factor of the last tick
    pub te: f64,      // charge dilation factor of the last tick
    pub tau: f64,     // accumulated proper time

    pub ps: [Sample; 5],         // history, oldest first
    pub pp: [Option<Sample>; 2], // latched pair
    pub first: bool,
    pub updated: bool,
    pub event: Option<Event>,
}

impl Body {
    pub fn new(
        name: &str,
        mass: f64,
        charge: f64,
        position: NVec3,
        velocity: NVec3,
        law: PhysicalLaw,
        kind: EventKind,
    ) -> Self {
        Self {
            id: BodyId::next(),
            name: Arc::from(name),
            mass,
            charge,
            hg: super::laws::H_GRAVITY,
            he: 0.0,
            law,
            kind,
            motion: Motion::Free,
            color: [255, 255, 255],
            p: position,
            v: [velocity, velocity],
            o: position,
            force: NVec3::zeros(),
            tg: 1.0,
            te: 1.0,
            tau: 0.0,
            ps: [Sample::default(); 5],
            pp: [None, None],
            first: true,
            updated: false,
            event: None,
        }
    }

    /// Override the gravity/charge scales
    pub fn with_scales(mut self, hg: f64, he: f64) -> Self {
        self.hg = hg;
        self.he = he;
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Fresh copy of this body's initial conditions bound to another law.
    /// The copy is a new construction: it gets its own id and empty history.
    pub fn dual(&self, law: PhysicalLaw) -> Self {
        let mut copy = Body::new(
            &self.name,
            self.mass,
            self.charge,
            self.p,
            self.v[0],
            law,
            self.kind,
        )
        .with_scales(self.hg, self.he)
        .with_motion(self.motion);
        copy.color = self.color;
        copy
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn hg(&self) -> f64 {
        self.hg
    }

    pub fn he(&self) -> f64 {
        self.he
    }

    pub fn law(&self) -> PhysicalLaw {
        self.law
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Current velocity
    pub fn velocity(&self) -> NVec3 {
        self.v[0]
    }

    /// Consume the latched event, clearing `updated`
    pub fn take_event(&mut self) -> Option<Event> {
        self.updated = false;
        self.event.take()
    }
}
