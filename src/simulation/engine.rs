//! High-level runtime engine
//!
//! `Engine` owns the shared global step and one `Stepper` per running
//! scenario. `Comparison` pairs a Newtonian scenario with its finite-theory
//! dual and feeds the anomaly deltas of tracked bodies into
//! `StatsAggregator`s.

use std::sync::Arc;

use tracing::{debug, info};

use crate::configuration::config::EngineConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::events::Event;
use crate::simulation::laws::PhysicalLaw;
use crate::simulation::params::TimeStep;
use crate::simulation::scenario::Scenario;
use crate::simulation::stats::{AxisStats, StatsAggregator};
use crate::simulation::stepper::{ScenarioHandle, Stepper, StepperConfig};

pub struct Engine {
    dt: Arc<TimeStep>,
    steppers: Vec<Stepper>,
}

impl Engine {
    pub fn new(dt: f64) -> SimResult<Self> {
        Ok(Self {
            dt: Arc::new(TimeStep::new(dt)?),
            steppers: Vec::new(),
        })
    }

    /// One stepper per scenario, all sharing the global step `dt`.
    /// Handles come back in the order of `scenarios`.
    pub fn start(scenarios: Vec<Scenario>, cfg: &EngineConfig, dt: f64) -> SimResult<(Self, Vec<ScenarioHandle>)> {
        let mut engine = Self::new(dt)?;
        let handles = scenarios
            .into_iter()
            .map(|scenario| engine.spawn(scenario, StepperConfig::from(cfg)))
            .collect::<SimResult<Vec<_>>>()?;
        info!(scenarios = handles.len(), dt, "engine started");
        Ok((engine, handles))
    }

    pub fn time_step(&self) -> Arc<TimeStep> {
        Arc::clone(&self.dt)
    }

    /// Change the global step; picked up by every stepper at its next tick
    pub fn set_dt(&self, dt: f64) -> SimResult<()> {
        self.dt.set(dt)?;
        debug!(dt, "global step changed");
        Ok(())
    }

    /// Start stepping `scenario` on its own thread
    pub fn spawn(&mut self, scenario: Scenario, cfg: StepperConfig) -> SimResult<ScenarioHandle> {
        let stepper = Stepper::spawn(scenario, self.time_step(), cfg)?;
        let handle = stepper.handle();
        self.steppers.push(stepper);
        Ok(handle)
    }

    pub fn handles(&self) -> Vec<ScenarioHandle> {
        self.steppers.iter().map(Stepper::handle).collect()
    }

    /// Cancel every stepper, then join them in spawn order
    pub fn shutdown(self) -> SimResult<Vec<Scenario>> {
        for stepper in &self.steppers {
            stepper.handle().cancel();
        }
        let scenarios = self
            .steppers
            .into_iter()
            .map(Stepper::join)
            .collect::<SimResult<Vec<_>>>()?;
        info!(scenarios = scenarios.len(), "engine shut down");
        Ok(scenarios)
    }
}

/// Anything events can be drained from, body by body
pub trait EventSource {
    fn body_count(&self) -> usize;
    fn take_event(&mut self, index: usize) -> Option<Event>;
}

impl EventSource for ScenarioHandle {
    fn body_count(&self) -> usize {
        self.len()
    }

    fn take_event(&mut self, index: usize) -> Option<Event> {
        ScenarioHandle::take_event(self, index)
    }
}

impl EventSource for Scenario {
    fn body_count(&self) -> usize {
        self.len()
    }

    fn take_event(&mut self, index: usize) -> Option<Event> {
        self.bodies_mut().get_mut(index)?.take_event()
    }
}

/// Statistics of finite-theory minus newtonian measurements per tracked body
pub struct Comparison {
    tracked: Vec<(usize, StatsAggregator)>,
}

impl Comparison {
    pub fn new(newtonian: &impl EventSource, finite: &impl EventSource, tracked: &[usize]) -> SimResult<Self> {
        let (left, right) = (newtonian.body_count(), finite.body_count());
        if left != right {
            return Err(SimError::MismatchedScenarios { left, right });
        }
        if let Some(&index) = tracked.iter().find(|&&i| i >= left) {
            return Err(SimError::TrackedOutOfRange { index, len: left });
        }
        Ok(Self {
            tracked: tracked.iter().map(|&i| (i, StatsAggregator::new())).collect(),
        })
    }

    /// Drain pending events of the tracked bodies from both sides.
    /// Returns how many deltas were recorded.
    pub fn poll(&mut self, newtonian: &mut impl EventSource, finite: &mut impl EventSource) -> SimResult<usize> {
        let mut recorded = 0;
        for (index, stats) in self.tracked.iter_mut() {
            let sides: [(PhysicalLaw, Option<Event>); 2] = [
                (PhysicalLaw::Newtonian, newtonian.take_event(*index)),
                (PhysicalLaw::FiniteTheory, finite.take_event(*index)),
            ];
            for (law, event) in sides {
                let Some(measurement) = event.as_ref().and_then(Event::measurement) else {
                    continue;
                };
                if stats.observe(law, measurement)?.is_some() {
                    recorded += 1;
                }
            }
        }
        Ok(recorded)
    }

    pub fn tracked(&self) -> impl Iterator<Item = usize> + '_ {
        self.tracked.iter().map(|(i, _)| *i)
    }

    pub fn stats(&self, index: usize) -> Option<&StatsAggregator> {
        self.tracked.iter().find(|(i, _)| *i == index).map(|(_, s)| s)
    }

    pub fn snapshot(&mut self, index: usize) -> Option<[AxisStats; 3]> {
        self.tracked
            .iter_mut()
            .find(|(i, _)| *i == index)
            .map(|(_, s)| s.snapshot())
    }
}
