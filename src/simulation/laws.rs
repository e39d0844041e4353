//! Physical laws a body can be bound to
//!
//! Each law is a pair of pure functions:
//! - a time law giving the local clock-rate (dilation) contribution of a source
//! - a force law giving the scalar interaction magnitude
//!
//! `Newtonian` leaves the clock alone and uses the inverse-square force.
//! `FiniteTheory` slows the local clock near mass/charge and bounds the force
//! at short range with a length `l = |m1| / scale`.

use serde::{Deserialize, Serialize};

/// Gravitational constant (m^3 kg^-1 s^-2)
pub const G: f64 = 6.67428e-11;

/// Speed of light (m/s)
pub const C: f64 = 299_792_458.0;

/// Coulomb constant (N m^2 C^-2)
pub const K: f64 = 8.987_551_792_3e9;

/// Default gravity scale for finite-theory bodies, c^2 / 2G (kg/m).
/// With it, `|m| / scale` is the Schwarzschild radius of the source.
pub const H_GRAVITY: f64 = C * C / (2.0 * G);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalLaw {
    Newtonian,
    FiniteTheory,
}

impl PhysicalLaw {
    /// Dilation factor in (0, 1] felt at `distance` from a source of `mass`
    pub fn time(self, mass: f64, distance: f64, scale: f64) -> f64 {
        match self {
            PhysicalLaw::Newtonian => 1.0,
            PhysicalLaw::FiniteTheory => {
                if scale <= 0.0 || !scale.is_finite() {
                    return 1.0;
                }
                scale / (self.dilation(mass, distance) + scale)
            }
        }
    }

    /// Additive term summed over all sources before normalising with
    /// `scale / (sum + scale)`. Zero for Newtonian bodies, which therefore
    /// run on the raw global step.
    pub fn dilation(self, mass: f64, distance: f64) -> f64 {
        match self {
            PhysicalLaw::Newtonian => 0.0,
            PhysicalLaw::FiniteTheory => mass.abs() / distance.abs(),
        }
    }

    /// Scalar interaction magnitude between `m1` (source) and `m2` (target)
    pub fn force(self, g: f64, m1: f64, m2: f64, distance: f64, scale: f64) -> f64 {
        let d2 = distance * distance;
        match self {
            PhysicalLaw::Newtonian => g * m1 * m2 / d2,
            PhysicalLaw::FiniteTheory => {
                let l = finite_length(m1, scale);
                if l == 0.0 {
                    return g * m1 * m2 / d2;
                }
                // attractive term minus short-range correction:
                // g m1 m2 / (d^2 + l^2) - g m1 m2 l^2 / (d^2 + l^2)^2
                let s = d2 + l * l;
                let attractive = g * m1 * m2 / s;
                attractive - attractive * (l * l) / s
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PhysicalLaw::Newtonian => "newtonian",
            PhysicalLaw::FiniteTheory => "finite-theory",
        }
    }
}

/// Characteristic length of a finite-theory source; zero when the scale is
/// unusable, which reduces the force to the Newtonian limit
fn finite_length(m1: f64, scale: f64) -> f64 {
    if scale <= 0.0 || !scale.is_finite() {
        return 0.0;
    }
    let l = m1.abs() / scale;
    if l.is_finite() {
        l
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_length_ignores_bad_scales() {
        assert_eq!(finite_length(1.0, 0.0), 0.0);
        assert_eq!(finite_length(1.0, -3.0), 0.0);
        assert_eq!(finite_length(1.0, f64::INFINITY), 0.0);
        assert_eq!(finite_length(-4.0, 2.0), 2.0);
    }

    #[test]
    fn finite_force_peaks_at_the_characteristic_length() {
        let law = PhysicalLaw::FiniteTheory;
        // l = 1, peak magnitude g m1 m2 / 4l^2
        let peak = law.force(1.0, 1.0, 1.0, 1.0, 1.0);
        assert!((peak - 0.25).abs() < 1e-15);
        assert!(law.force(1.0, 1.0, 1.0, 0.5, 1.0) < peak);
        assert!(law.force(1.0, 1.0, 1.0, 2.0, 1.0) < peak);
    }
}
