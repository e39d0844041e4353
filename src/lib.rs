pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Body, BodyId, Color, Motion, NVec3};
pub use simulation::laws::PhysicalLaw;
pub use simulation::params::{Parameters, TimeStep};
pub use simulation::forces::{accumulate, Interaction};
pub use simulation::integrator::{euler_integrator, StepReport};
pub use simulation::events::{Event, EventKind, Sample};
pub use simulation::stats::{Axis, AxisStats, Multiset, StatsAggregator};
pub use simulation::scenario::Scenario;
pub use simulation::stepper::{Frame, ScenarioHandle, Stepper, StepperConfig};
pub use simulation::engine::{Comparison, Engine, EventSource};
pub use simulation::galaxy::{GalaxyConfig, RotationModel};

pub use configuration::config::{BodyConfig, EngineConfig, EventConfig, LawConfig, ParametersConfig, ScenarioConfig};

pub use error::{SimError, SimResult};

pub use benchmark::benchmark::{bench_step, bench_step_curve};
