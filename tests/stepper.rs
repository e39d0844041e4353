use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ftsim::{
    AxisStats, Body, Comparison, Engine, EngineConfig, Event, EventKind, NVec3, Parameters, PhysicalLaw, Scenario, Stepper,
    StepperConfig, TimeStep,
};

/// Poll `cond` every millisecond until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

/// Two equal masses mirrored about the origin
pub fn mirror_scenario() -> Scenario {
    let law = PhysicalLaw::Newtonian;
    let bodies = vec![
        Body::new("left", 1.0, 0.0, NVec3::new(-1.0, 0.0, 0.0), NVec3::new(0.0, -0.5, 0.0), law, EventKind::None),
        Body::new("right", 1.0, 0.0, NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, 0.5, 0.0), law, EventKind::None),
    ];
    Scenario::new("mirror", Parameters { g: 1.0, k: 0.0, dt: 1e-3 }, bodies).expect("valid scenario")
}

pub fn orbit_scenario(kind: EventKind) -> Scenario {
    let law = PhysicalLaw::Newtonian;
    let bodies = vec![
        Body::new("anchor", 1.0, 0.0, NVec3::zeros(), NVec3::zeros(), law, EventKind::None),
        Body::new("test", 1e-6, 0.0, NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, 1.0, 0.0), law, kind),
    ];
    Scenario::new("orbit", Parameters { g: 1.0, k: 0.0, dt: 1e-3 }, bodies).expect("valid scenario")
}

fn quick() -> StepperConfig {
    StepperConfig {
        poll: Duration::from_millis(20),
        ..StepperConfig::default()
    }
}

const PATIENCE: Duration = Duration::from_secs(10);

// ==================================================================================
// Stepper lifecycle
// ==================================================================================

#[test]
fn stepper_runs_until_cancelled() {
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(mirror_scenario(), dt, quick()).unwrap();
    let handle = stepper.handle();

    assert!(wait_for(PATIENCE, || handle.generation() >= 10));
    let scenario = stepper.stop().unwrap();
    assert!(scenario.tick >= 10);
    assert!(handle.is_cancelled());
    // nothing is published after the join
    let last = handle.generation();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(handle.generation(), last);
    assert_eq!(last, scenario.tick);
}

#[test]
fn disabled_stepper_parks_until_enabled() {
    let cfg = StepperConfig {
        enabled: false,
        ..quick()
    };
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(mirror_scenario(), dt, cfg).unwrap();
    let handle = stepper.handle();

    thread::sleep(Duration::from_millis(100));
    assert_eq!(handle.generation(), 0);
    assert_eq!(handle.frame().tick, 0);
    assert!(!handle.is_enabled());

    handle.set_enabled(true);
    assert!(wait_for(PATIENCE, || handle.generation() > 0));

    handle.set_enabled(false);
    // at most the tick in flight lands after disabling
    thread::sleep(Duration::from_millis(50));
    let parked = handle.generation();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(handle.generation(), parked);

    stepper.stop().unwrap();
}

#[test]
fn cancel_wakes_a_parked_stepper() {
    let cfg = StepperConfig {
        poll: Duration::from_secs(60),
        enabled: false,
        ..StepperConfig::default()
    };
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(mirror_scenario(), dt, cfg).unwrap();

    let started = Instant::now();
    let scenario = stepper.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(scenario.tick, 0);
}

#[test]
fn tick_interval_throttles_the_loop() {
    let cfg = StepperConfig {
        tick_interval: Some(Duration::from_millis(20)),
        ..quick()
    };
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(mirror_scenario(), dt, cfg).unwrap();
    thread::sleep(Duration::from_millis(200));
    let scenario = stepper.stop().unwrap();
    assert!(scenario.tick <= 12, "ran {} ticks", scenario.tick);
}

// ==================================================================================
// Publication
// ==================================================================================

#[test]
fn readers_only_see_whole_ticks() {
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(mirror_scenario(), dt, quick()).unwrap();
    let handle = stepper.handle();

    let reader = {
        let handle = handle.clone();
        thread::spawn(move || {
            let mut last = 0;
            let mut seen = 0;
            while seen < 2000 {
                let frame = handle.frame();
                assert!(frame.generation >= last, "generation went backwards");
                last = frame.generation;
                assert_eq!(frame.tick, frame.generation);
                // the mirror symmetry only holds for a complete tick
                let (l, r) = (frame.bodies[0].p, frame.bodies[1].p);
                assert_eq!(l, -r);
                seen += 1;
            }
            last
        })
    };

    let last = reader.join().unwrap();
    stepper.stop().unwrap();
    assert!(last > 0);
}

#[test]
fn events_reach_the_latches() {
    let dt = Arc::new(TimeStep::new(1e-3).unwrap());
    let stepper = Stepper::spawn(orbit_scenario(EventKind::EveryTick), dt, quick()).unwrap();
    let handle = stepper.handle();

    let mut event = None;
    assert!(wait_for(PATIENCE, || {
        event = handle.take_event(1);
        event.is_some()
    }));
    match event {
        Some(Event::Tick { dt_eff, .. }) => assert_eq!(dt_eff, 1e-3),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(handle.take_event(0).is_none());
    assert!(handle.take_event(7).is_none());

    let scenario = stepper.stop().unwrap();
    // the stepper drained the bodies into the latches
    assert!(scenario.bodies().iter().all(|b| !b.updated));
}

// ==================================================================================
// Engine
// ==================================================================================

#[test]
fn engine_step_change_reaches_every_stepper() {
    let mut engine = Engine::new(1e-3).unwrap();
    let a = engine.spawn(mirror_scenario(), quick()).unwrap();
    let b = engine.spawn(orbit_scenario(EventKind::None), quick()).unwrap();
    assert_eq!(engine.handles().len(), 2);

    assert!(engine.set_dt(0.0).is_err());
    engine.set_dt(2e-3).unwrap();
    assert!(wait_for(PATIENCE, || a.frame().dt == 2e-3 && b.frame().dt == 2e-3));

    let scenarios = engine.shutdown().unwrap();
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].name, "mirror");
    assert_eq!(scenarios[1].name, "orbit");
}

#[test]
fn engine_start_spawns_in_order() {
    let cfg = EngineConfig {
        poll_ms: 20,
        ..EngineConfig::default()
    };
    assert!(Engine::start(vec![mirror_scenario()], &cfg, -1.0).is_err());

    let (engine, handles) = Engine::start(vec![mirror_scenario(), orbit_scenario(EventKind::None)], &cfg, 1e-3).unwrap();
    assert_eq!(handles.len(), 2);
    assert_eq!(handles[0].name(), "mirror");
    assert_eq!(handles[1].len(), 2);
    assert!(wait_for(PATIENCE, || handles.iter().all(|h| h.generation() > 0)));

    let scenarios = engine.shutdown().unwrap();
    assert!(scenarios.iter().all(|s| s.tick > 0));
    assert!(handles.iter().all(|h| h.is_cancelled()));
}

#[test]
fn engine_comparison_collects_deltas() {
    let newtonian = orbit_scenario(EventKind::EveryTick);
    let finite = newtonian.dual(PhysicalLaw::FiniteTheory).unwrap();

    let mut engine = Engine::new(1e-3).unwrap();
    let mut left = engine.spawn(newtonian, quick()).unwrap();
    let mut right = engine.spawn(finite, quick()).unwrap();
    let mut comparison = Comparison::new(&left, &right, &[1]).unwrap();

    let mut recorded = 0;
    assert!(wait_for(PATIENCE, || {
        recorded += comparison.poll(&mut left, &mut right).unwrap();
        recorded >= 5
    }));

    let snap = comparison.snapshot(1).unwrap();
    for axis in snap {
        match axis {
            AxisStats::Summary { samples, median, .. } => {
                assert_eq!(samples, recorded);
                assert!(median.is_finite());
            }
            AxisStats::NoData => panic!("expected data after {recorded} deltas"),
        }
    }

    engine.shutdown().unwrap();
}
