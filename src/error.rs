//! Error types for the simulation core
//!
//! Numerical trouble inside a tick is never an error (the offending
//! contribution is skipped). Errors are reserved for bad construction data
//! and bad runtime settings, which are rejected before a run starts.

use thiserror::Error;

/// Result type alias for simulation operations
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario `{0}` has no bodies")]
    EmptyScenario(String),

    #[error("anchor body `{name}` needs a positive finite mass, got {mass}")]
    InvalidAnchorMass { name: String, mass: f64 },

    #[error("body `{name}`: {field} must be non-negative, got {value}")]
    NegativeScale {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("body `{name}`: finite-theory law needs a positive gravity scale")]
    MissingGravityScale { name: String },

    #[error("body `{name}`: {field} is not finite")]
    NonFinite { name: String, field: &'static str },

    #[error("body `{name}`: invalid event parameter {field} = {value}")]
    InvalidEvent {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("body `{name}`: expected a 3-component {field}, got {len} components")]
    BadVector {
        name: String,
        field: &'static str,
        len: usize,
    },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("physical constant {field} must be non-negative and finite, got {value}")]
    InvalidConstant { field: &'static str, value: f64 },

    #[error("statistic sample must be finite, got {0}")]
    NonFiniteSample(f64),

    #[error("compared scenarios differ in size: {left} vs {right} bodies")]
    MismatchedScenarios { left: usize, right: usize },

    #[error("tracked body index {index} out of range for {len} bodies")]
    TrackedOutOfRange { index: usize, len: usize },

    #[error("stepper thread for `{0}` panicked")]
    StepperPanicked(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
