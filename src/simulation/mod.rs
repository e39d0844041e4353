pub mod states;
pub mod params;
pub mod laws;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod events;
pub mod stats;
pub mod scenario;
pub mod stepper;
pub mod galaxy;
