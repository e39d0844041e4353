//! Background stepping of one scenario
//!
//! A [`Stepper`] owns its scenario on a dedicated thread and runs the
//! integrator back to back while the scenario is enabled. After every tick
//! it publishes an immutable [`Frame`] (whole scenario, never half a tick)
//! and moves fired events into per-body latches that readers drain through
//! [`ScenarioHandle::take_event`].
//!
//! While disabled the thread parks on a condition variable, re-checking every
//! `poll` interval. Cancellation wakes it immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{info, warn};

use crate::configuration::config::EngineConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::events::Event;
use crate::simulation::integrator::euler_integrator;
use crate::simulation::params::TimeStep;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::Body;

/// Immutable copy of a scenario after a completed tick
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: u64, // publications so far, 0 = initial state
    pub tick: u64,
    pub t: f64,
    pub dt: f64, // global step used for this tick
    pub skipped: usize,
    pub bodies: Vec<Body>,
}

impl Frame {
    fn initial(scenario: &Scenario, dt: f64) -> Self {
        Self {
            generation: 0,
            tick: scenario.tick,
            t: scenario.t,
            dt,
            skipped: 0,
            bodies: scenario.bodies().to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepperConfig {
    pub poll: Duration,                  // re-check interval while disabled
    pub tick_interval: Option<Duration>, // minimum wall time per tick
    pub enabled: bool,                   // initial visibility
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(100),
            tick_interval: None,
            enabled: true,
        }
    }
}

impl From<&EngineConfig> for StepperConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            poll: Duration::from_millis(cfg.poll_ms),
            tick_interval: cfg.tick_interval_us.map(Duration::from_micros),
            enabled: true,
        }
    }
}

#[derive(Debug)]
struct Gate {
    enabled: bool,
    cancelled: bool,
}

#[derive(Debug)]
struct Shared {
    name: String,
    frame: RwLock<Arc<Frame>>,
    generation: AtomicU64,
    latches: Vec<Mutex<Option<Event>>>,
    gate: Mutex<Gate>,
    wake: Condvar,
}

impl Shared {
    /// Park until enabled. Returns false once cancelled.
    fn wait_enabled(&self, poll: Duration) -> bool {
        let mut gate = self.gate.lock();
        while !gate.enabled && !gate.cancelled {
            self.wake.wait_for(&mut gate, poll);
        }
        !gate.cancelled
    }

    /// Sleep for `d` unless cancelled first. Returns false once cancelled.
    fn pause(&self, d: Duration) -> bool {
        let deadline = Instant::now() + d;
        let mut gate = self.gate.lock();
        while !gate.cancelled {
            if self.wake.wait_until(&mut gate, deadline).timed_out() {
                break;
            }
        }
        !gate.cancelled
    }

    fn publish(&self, scenario: &Scenario, dt: f64, skipped: usize) {
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let frame = Arc::new(Frame {
            generation,
            tick: scenario.tick,
            t: scenario.t,
            dt,
            skipped,
            bodies: scenario.bodies().to_vec(),
        });
        *self.frame.write() = frame;
        self.generation.store(generation, Ordering::Release);
    }
}

/// Reader/controller side of a running scenario; cheap to clone
#[derive(Debug, Clone)]
pub struct ScenarioHandle {
    shared: Arc<Shared>,
}

impl ScenarioHandle {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn len(&self) -> usize {
        self.shared.latches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.latches.is_empty()
    }

    /// Latest complete frame
    pub fn frame(&self) -> Arc<Frame> {
        Arc::clone(&self.shared.frame.read())
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Pending event of body `index`, clearing it
    pub fn take_event(&self, index: usize) -> Option<Event> {
        self.shared.latches.get(index)?.lock().take()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.gate.lock().enabled = enabled;
        self.shared.wake.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.gate.lock().enabled
    }

    pub fn cancel(&self) {
        self.shared.gate.lock().cancelled = true;
        self.shared.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.gate.lock().cancelled
    }
}

/// Owner of the stepping thread. Dropping it cancels and joins.
#[derive(Debug)]
pub struct Stepper {
    handle: ScenarioHandle,
    thread: Option<JoinHandle<Scenario>>,
}

impl Stepper {
    pub fn spawn(scenario: Scenario, dt: Arc<TimeStep>, cfg: StepperConfig) -> SimResult<Self> {
        let shared = Arc::new(Shared {
            name: scenario.name.clone(),
            frame: RwLock::new(Arc::new(Frame::initial(&scenario, dt.get()))),
            generation: AtomicU64::new(0),
            latches: (0..scenario.len()).map(|_| Mutex::new(None)).collect(),
            gate: Mutex::new(Gate {
                enabled: cfg.enabled,
                cancelled: false,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name(format!("stepper-{}", scenario.name))
            .spawn(move || run(scenario, &worker, &dt, &cfg))?;

        Ok(Self {
            handle: ScenarioHandle { shared },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> ScenarioHandle {
        self.handle.clone()
    }

    /// Wait for the thread to finish and return the final scenario.
    /// The thread only finishes after [`ScenarioHandle::cancel`].
    pub fn join(mut self) -> SimResult<Scenario> {
        let name = self.handle.name().to_string();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| SimError::StepperPanicked(name)),
            None => Err(SimError::StepperPanicked(name)),
        }
    }

    /// Cancel and join
    pub fn stop(self) -> SimResult<Scenario> {
        self.handle.cancel();
        self.join()
    }
}

impl Drop for Stepper {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.handle.cancel();
            if thread.join().is_err() {
                warn!(scenario = %self.handle.name(), "stepper thread panicked");
            }
        }
    }
}

fn run(mut scenario: Scenario, shared: &Shared, dt: &TimeStep, cfg: &StepperConfig) -> Scenario {
    info!(scenario = %scenario.name, bodies = scenario.len(), "stepper started");

    while shared.wait_enabled(cfg.poll) {
        let started = Instant::now();
        let step = dt.get();
        let report = euler_integrator(&mut scenario, step);
        shared.publish(&scenario, step, report.skipped);

        if report.events > 0 {
            for (body, latch) in scenario.bodies_mut().iter_mut().zip(&shared.latches) {
                if body.updated {
                    if let Some(event) = body.take_event() {
                        // at most one pending event per body
                        *latch.lock() = Some(event);
                    }
                }
            }
        }

        if let Some(interval) = cfg.tick_interval {
            let elapsed = started.elapsed();
            if elapsed < interval && !shared.pause(interval - elapsed) {
                break;
            }
        }
    }

    info!(scenario = %scenario.name, ticks = scenario.tick, t = scenario.t, "stepper stopped");
    scenario
}
