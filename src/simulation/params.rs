//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the per-scenario constants:
//! - gravitational and Coulomb constants (`g`, `k`),
//! - the initial integration step `dt`.
//!
//! `TimeStep` is the live global step shared by every stepper; it may be
//! changed at any time between ticks.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub g: f64,  // gravitational constant
    pub k: f64,  // coulomb constant
    pub dt: f64, // initial step size
}

impl Parameters {
    pub fn validate(&self) -> SimResult<()> {
        for (field, value) in [("g", self.g), ("k", self.k)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidConstant { field, value });
            }
        }
        check_dt(self.dt)?;
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: super::laws::G,
            k: super::laws::K,
            dt: 1.0,
        }
    }
}

/// Global step, read by steppers once per tick
#[derive(Debug)]
pub struct TimeStep {
    bits: AtomicU64,
}

impl TimeStep {
    pub fn new(dt: f64) -> SimResult<Self> {
        check_dt(dt)?;
        Ok(Self {
            bits: AtomicU64::new(dt.to_bits()),
        })
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, dt: f64) -> SimResult<()> {
        check_dt(dt)?;
        self.bits.store(dt.to_bits(), Ordering::Release);
        Ok(())
    }
}

fn check_dt(dt: f64) -> SimResult<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTimeStep(dt))
    }
}
