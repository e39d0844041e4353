//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – stepper settings and which bodies to compare
//! - [`ParametersConfig`] – step size and physical constants
//! - [`BodyConfig`]       – initial state, law and event kind of each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A Sun/Mercury precession scenario matching these types:
//!
//! ```yaml
//! name: mercury
//!
//! engine:
//!   poll_ms: 100            # visibility re-check while disabled
//!   compare: true           # also run a finite-theory copy
//!   tracked: [1]            # body indices fed to the statistics
//!
//! parameters:
//!   dt: 3600.0              # seconds per tick
//!
//! bodies:
//!   - name: Sun
//!     m: 1.98911e30
//!     x: [0.0, 0.0, 0.0]
//!     v: [0.0, 0.0, 0.0]
//!   - name: Mercury
//!     m: 3.302e23
//!     x: [4.6e10, 0.0, 0.0]
//!     v: [0.0, 58980.0, 0.0]
//!     event:
//!       kind: perihelion
//! ```
//!
//! [`crate::simulation::scenario::Scenario::build_scenario`] maps this
//! configuration into the runtime scenario.

use serde::Deserialize;

/// Which physical law a body follows
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LawConfig {
    #[default]
    #[serde(rename = "newtonian")] // inverse-square force, raw global step
    Newtonian,

    #[serde(rename = "finite_theory")] // bounded force, dilated local step
    FiniteTheory,
}

/// Event detector a body carries
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventConfig {
    #[default]
    None,
    Perihelion {
        band: Option<f64>, // relative tolerance band, defaults to 1e-8
    },
    LightBending {
        threshold: f64, // x offset from the anchor
    },
    DomainCrossing {
        cell: f64, // cell size along x
    },
    EveryTick,
}

/// Stepper and comparison settings
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64, // wait increment while a scenario is disabled
    #[serde(default)]
    pub tick_interval_us: Option<u64>, // minimum wall time per tick, none = run flat out
    #[serde(default = "default_compare")]
    pub compare: bool, // run a finite-theory dual next to the scenario
    #[serde(default)]
    pub tracked: Vec<usize>, // body indices compared between the two laws
}

fn default_poll_ms() -> u64 {
    100
}

fn default_compare() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
            tick_interval_us: None,
            compare: default_compare(),
            tracked: Vec::new(),
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,        // time step size
    pub g: Option<f64>, // gravitational constant, SI value if absent
    pub k: Option<f64>, // coulomb constant, SI value if absent
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64,      // mass
    #[serde(default)]
    pub q: f64, // charge
    pub hg: Option<f64>, // gravity scale, c^2/2G if absent
    pub he: Option<f64>, // charge scale, 0 (disabled) if absent
    #[serde(default)]
    pub law: LawConfig,
    #[serde(default)]
    pub event: EventConfig,
    pub omega: Option<f64>, // prescribed angular rate about the anchor (rad/s), integrated if absent
    pub color: Option<[u8; 3]>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub engine: EngineConfig, // stepper settings
    pub parameters: ParametersConfig, // step size and constants
    pub bodies: Vec<BodyConfig>, // initial state of the system, anchor first
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> crate::error::SimResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
