//! Galactic rotation curves
//!
//! Builds the rotation speed of a disk of stars under five models:
//! - observed: flat curve `v0 * 2/pi * atan(r / r0)`
//! - visible: enclosed luminous mass only
//! - dark matter: isothermal-like halo `r/rdm0 - atan(r/rdm0)`
//! - total: visible and dark added in quadrature
//! - finite theory: halo speed plus a constant angular-rate offset
//!
//! Masses here are dynamical (`G * M`, i.e. `v^2 r`), converted to kg only
//! when a scenario is built.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::error::SimResult;
use crate::simulation::events::EventKind;
use crate::simulation::laws::PhysicalLaw;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Body, Motion, NVec3};

/// Angular-rate offset of the finite-theory curve (rad/s)
pub const FINITE_OMEGA_OFFSET: f64 = 2.83273668e-16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationModel {
    Observed,
    Visible,
    DarkMatter,
    Total,
    FiniteTheory,
}

impl RotationModel {
    pub const ALL: [RotationModel; 5] = [
        RotationModel::Observed,
        RotationModel::Visible,
        RotationModel::DarkMatter,
        RotationModel::Total,
        RotationModel::FiniteTheory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RotationModel::Observed => "observed",
            RotationModel::Visible => "visible",
            RotationModel::DarkMatter => "dark-matter",
            RotationModel::Total => "total",
            RotationModel::FiniteTheory => "finite-theory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub index: usize, // 1-based star index
    pub r: f64,       // radius (m)
    pub v: f64,       // orbital speed (m/s)
    pub omega: f64,   // angular rate (rad/s)
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GalaxyConfig {
    pub stars: usize, // number of stars in the disk
    pub h: f64,       // radial spread of the disk (m)
    pub r0: f64,      // turnover radius of the observed curve (m)
    pub v0: f64,      // asymptotic observed speed (m/s)
    pub rdm0: f64,    // halo core radius (m)
    pub dmf: f64,     // halo mass factor
    pub emax: f64,    // outermost star position as a fraction of the disk, < 1
    pub massf: f64,   // visible mass factor
    pub seed: u64,    // azimuth placement seed
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            stars: 200,
            h: 3.0e20,
            r0: 3.0e19,
            v0: 2.2e5,
            rdm0: 3.0e20,
            dmf: 1.0,
            emax: 0.9,
            massf: 1.0,
            seed: 42,
        }
    }
}

impl GalaxyConfig {
    /// Star radii, innermost first: `h * sqrt(tan(pi/2 * emax * i / (n+1)))`
    pub fn radii(&self) -> Vec<f64> {
        let n = self.stars as f64;
        (1..=self.stars)
            .map(|i| self.h * (0.5 * PI * self.emax * i as f64 / (n + 1.0)).tan().sqrt())
            .collect()
    }

    fn observed_speed(&self, r: f64) -> f64 {
        self.v0 * 2.0 / PI * (r / self.r0).atan()
    }

    /// Dynamical mass implied by the observed speed at the outermost star
    pub fn total_mass(&self) -> f64 {
        match self.radii().last() {
            Some(&r) => self.observed_speed(r).powi(2) * r,
            None => 0.0,
        }
    }

    /// Dynamical mass of one star: the visible disk is an eighth of the total
    pub fn star_mass(&self) -> f64 {
        self.total_mass() / (8.0 * (self.stars as f64 + 1.0))
    }

    fn halo_profile(&self, r: f64) -> f64 {
        r / self.rdm0 - (r / self.rdm0).atan()
    }

    /// Halo normalisation: missing mass spread with the halo profile
    fn halo_mass(&self) -> f64 {
        let Some(&r_n) = self.radii().last() else {
            return 0.0;
        };
        let missing = self.total_mass() - self.star_mass() * self.massf * (self.stars as f64 + 1.0);
        missing * self.dmf / self.halo_profile(r_n)
    }

    pub fn rotation_curve(&self, model: RotationModel) -> Vec<CurvePoint> {
        let star = self.star_mass() * self.massf;
        let halo = self.halo_mass();

        self.radii()
            .into_iter()
            .enumerate()
            .map(|(k, r)| {
                let index = k + 1;
                let visible = || (index as f64 * star / r).sqrt();
                let dark = || (halo * self.halo_profile(r) / r).max(0.0).sqrt();
                let v = match model {
                    RotationModel::Observed => self.observed_speed(r),
                    RotationModel::Visible => visible(),
                    RotationModel::DarkMatter | RotationModel::FiniteTheory => dark(),
                    RotationModel::Total => visible().hypot(dark()),
                };
                let mut omega = v / r;
                if model == RotationModel::FiniteTheory {
                    omega += FINITE_OMEGA_OFFSET;
                }
                CurvePoint { index, r, v, omega }
            })
            .collect()
    }

    /// Nucleus holding the total dynamical mass plus the stars of `model`'s
    /// curve at random quadrant azimuths. Stars turn kinematically at their
    /// curve's angular rate around the pinned nucleus, so the disk follows
    /// the rotation curve exactly. Every star reports its state each tick.
    pub fn disk_scenario(&self, model: RotationModel, law: PhysicalLaw, parameters: Parameters) -> SimResult<Scenario> {
        let g = parameters.g;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut bodies = Vec::with_capacity(self.stars + 1);
        bodies.push(
            Body::new("Nucleus", self.total_mass() / g, 0.0, NVec3::zeros(), NVec3::zeros(), law, EventKind::None)
                .with_motion(Motion::Rotating { omega: 0.0 })
                .with_color([255, 255, 0]),
        );

        let star_kg = self.star_mass() * self.massf / g;
        for point in self.rotation_curve(model) {
            let alpha = 0.5 * PI * rng.gen_range(1..=4u32) as f64;
            let (s, c) = alpha.sin_cos();
            let position = NVec3::new(point.r * c, point.r * s, 0.0);
            let velocity = NVec3::new(-s, c, 0.0) * (point.omega * point.r);
            let name = format!("Star{}", point.index);
            bodies.push(
                Body::new(&name, star_kg, 0.0, position, velocity, law, EventKind::EveryTick)
                    .with_motion(Motion::Rotating { omega: point.omega })
                    .with_color([255, 0, 0]),
            );
        }

        Scenario::new(format!("galaxy-{}", model.name()), parameters, bodies)
    }
}
