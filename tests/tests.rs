use bodysim::simulation::forces::{NewtonianGravity, DISTANCE_MIN, GRAVITATIONAL_CONSTANT};
use bodysim::simulation::integrator::{Fall, Gravity, Integrator};
use bodysim::simulation::scenario::Scenario;
use bodysim::simulation::scheduler::{Scheduler, SimulationConfig};
use bodysim::simulation::sink::{RenderSink, TrajectoryRecorder};
use bodysim::simulation::states::{Body, NVec2, System};
use bodysim::configuration::config::ScenarioConfig;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Build a simple 2-body system separated along the x-axis
fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body {
        x: NVec2::new(-dist / 2.0, 0.0),
        v: NVec2::zeros(),
        m: m1,
    };
    let b2 = Body {
        x: NVec2::new(dist / 2.0, 0.0),
        v: NVec2::zeros(),
        m: m2,
    };
    System {
        bodies: vec![b1, b2],
        t: 0.0,
    }
}

/// Three equal masses at rest, mutually attracting
fn three_body_system() -> System {
    let m = 1.0e16;
    let bodies = vec![
        Body {
            x: NVec2::new(0.0, 0.0),
            v: NVec2::zeros(),
            m,
        },
        Body {
            x: NVec2::new(100.0, -100.0),
            v: NVec2::zeros(),
            m,
        },
        Body {
            x: NVec2::new(-200.0, -100.0),
            v: NVec2::zeros(),
            m,
        },
    ];
    System { bodies, t: 0.0 }
}

/// Sink that counts its render calls
struct CountingSink {
    calls: Arc<AtomicUsize>,
}

impl RenderSink for CountingSink {
    fn render(&mut self, _bodies: &[Body]) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting_sink"
    }
}

/// Sink that always fails
struct FailingSink;

impl RenderSink for FailingSink {
    fn render(&mut self, _bodies: &[Body]) -> anyhow::Result<()> {
        anyhow::bail!("sink deliberately broken")
    }

    fn name(&self) -> &str {
        "failing_sink"
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn single_body_at_rest_stays_put() {
    let mut sys = System {
        bodies: vec![Body {
            x: NVec2::new(3.0, -4.0),
            v: NVec2::zeros(),
            m: 1.0e16,
        }],
        t: 0.0,
    };
    let integrator = Gravity::default();

    for _ in 0..1000 {
        integrator.tick(&mut sys, 0.01);
    }

    // No other bodies means zero net force, exactly
    assert_eq!(sys.bodies[0].x, NVec2::new(3.0, -4.0));
    assert_eq!(sys.bodies[0].v, NVec2::zeros());
}

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(120.0, 2.0e16, 3.0e16);
    let forces = NewtonianGravity::default();

    let mut f = vec![NVec2::zeros(); 2];
    forces.accumulate_forces(&sys, &mut f);

    // Equal and opposite, exactly: the pair loop applies one computed value
    // with both signs
    assert_eq!(f[0], -f[1]);
    assert!(f[0].norm() > 0.0);
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(200.0, 1.0e16, 1.0e16);
    let forces = NewtonianGravity::default();

    let mut f = vec![NVec2::zeros(); 2];
    forces.accumulate_forces(&sys, &mut f);

    let dx = sys.bodies[1].x - sys.bodies[0].x;
    assert!(f[0].dot(&dx) > 0.0, "force is not toward second body");
}

#[test]
fn momentum_is_conserved() {
    let mut sys = three_body_system();
    sys.bodies[0].v = NVec2::new(5.0, -2.0);
    sys.bodies[1].v = NVec2::new(-3.0, 1.0);

    let momentum =
        |s: &System| -> NVec2 { s.bodies.iter().map(|b| b.m * b.v).sum::<NVec2>() };

    let p0 = momentum(&sys);
    let integrator = Gravity::default();
    for _ in 0..500 {
        integrator.tick(&mut sys, 1.0e-4);
    }
    let p1 = momentum(&sys);

    let scale: f64 = sys.bodies.iter().map(|b| b.m * b.v.norm()).sum::<f64>() + 1.0;
    assert!(
        (p1 - p0).norm() < scale * 1.0e-10,
        "momentum drifted: {:?} -> {:?}",
        p0,
        p1
    );
}

#[test]
fn softening_floor_replaces_small_cubed_distance() {
    // Separation 2.0 has cubed distance 8, well below the floor of 50, so
    // the force must be computed with the floor, not the true value
    let dist = 2.0;
    let m = 1.0e10;
    let sys = two_body_system(dist, m, m);
    let forces = NewtonianGravity::default();

    let mut f = vec![NVec2::zeros(); 2];
    forces.accumulate_forces(&sys, &mut f);

    let clamped = GRAVITATIONAL_CONSTANT * m * m * dist / DISTANCE_MIN;
    let unclamped = GRAVITATIONAL_CONSTANT * m * m * dist / dist.powi(3);

    assert!(
        (f[0].norm() - clamped).abs() < clamped * 1.0e-12,
        "expected clamped force {clamped}, got {}",
        f[0].norm()
    );
    assert!((f[0].norm() - unclamped).abs() > clamped, "floor was not applied");
}

#[test]
fn three_bodies_at_rest_fall_toward_each_other() {
    let mut sys = three_body_system();
    let d0 = (sys.bodies[0].x - sys.bodies[1].x).norm();

    let integrator = Gravity::default();
    for _ in 0..1000 {
        integrator.tick(&mut sys, 5.0e-5);
    }

    // The closest pair starts at rest and mutually attracts
    let d1 = (sys.bodies[0].x - sys.bodies[1].x).norm();
    assert!(d1 < d0, "closest pair did not approach: {d0} -> {d1}");
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn fall_accelerates_downward() {
    let mut sys = System {
        bodies: vec![Body {
            x: NVec2::new(0.0, 100.0),
            v: NVec2::zeros(),
            m: 1.0,
        }],
        t: 0.0,
    };
    let integrator = Fall::default();

    integrator.tick(&mut sys, 0.1);

    // v.y = 0.1 * 10, then y -= v.y * 0.1
    assert!((sys.bodies[0].v.y - 1.0).abs() < 1.0e-12);
    assert!((sys.bodies[0].x.y - 99.9).abs() < 1.0e-12);
    assert!((sys.t - 0.1).abs() < 1.0e-12);
}

#[test]
fn ticks_advance_simulated_time() {
    let mut sys = two_body_system(100.0, 1.0e16, 1.0e16);
    let integrator = Gravity::default();

    for _ in 0..10 {
        integrator.tick(&mut sys, 0.5);
    }
    assert!((sys.t - 5.0).abs() < 1.0e-9);
}

// ==================================================================================
// Scheduler tests
// ==================================================================================

#[test]
fn pacing_iteration_sleeps_to_budget() {
    // 0.01 * 10 / 1.0 = 0.1 s of wall clock per iteration
    let config = Arc::new(SimulationConfig::new(0.01, 10, 1.0));
    let sys = two_body_system(100.0, 1.0e16, 1.0e16);
    let mut scheduler = Scheduler::new(sys, Box::new(Fall::default()), config);

    let start = Instant::now();
    let keep_going = scheduler.run_once().unwrap();
    let elapsed = start.elapsed();

    assert!(keep_going);
    assert!(
        elapsed >= Duration::from_millis(90),
        "iteration returned too early: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(300),
        "iteration overslept: {elapsed:?}"
    );
}

#[test]
fn ratio_controls_ticks_and_notifications_per_iteration() {
    let config = Arc::new(SimulationConfig::new(1.0e-6, 7, 1000.0));
    let sys = two_body_system(100.0, 1.0e16, 1.0e16);

    let per_tick_calls = Arc::new(AtomicUsize::new(0));
    let per_iter_calls = Arc::new(AtomicUsize::new(0));
    let mut scheduler = Scheduler::new(sys, Box::new(Fall::default()), config)
        .with_per_tick_sink(CountingSink {
            calls: per_tick_calls.clone(),
        })
        .with_per_iteration_sink(CountingSink {
            calls: per_iter_calls.clone(),
        });

    scheduler.run_once().unwrap();

    assert_eq!(per_iter_calls.load(Ordering::Relaxed), 1);
    assert_eq!(per_tick_calls.load(Ordering::Relaxed), 7);
    assert!((scheduler.system().t - 7.0e-6).abs() < 1.0e-12);
}

#[test]
fn pause_suspends_simulation_and_rendering() {
    let config = Arc::new(SimulationConfig::default());
    config.set_paused(true);

    let sys = two_body_system(100.0, 1.0e16, 1.0e16);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut scheduler = Scheduler::new(sys, Box::new(Gravity::default()), config.clone())
        .with_per_tick_sink(CountingSink {
            calls: calls.clone(),
        });

    let start = Instant::now();
    assert!(scheduler.run_once().unwrap());
    let elapsed = start.elapsed();

    // Paused iteration does nothing but wait out the check interval
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(scheduler.system().t, 0.0);
    assert!(elapsed >= Duration::from_millis(90));
    assert!(elapsed < Duration::from_millis(250));

    // Unpausing is observed on the next iteration
    config.set_paused(false);
    config.set_simulation_to_reality_ratio(1000.0);
    config.set_tick_step(1.0e-6);
    scheduler.run_once().unwrap();
    assert!(calls.load(Ordering::Relaxed) > 0);
    assert!(scheduler.system().t > 0.0);
}

#[test]
fn stop_flag_ends_spawned_scheduler() {
    let config = Arc::new(SimulationConfig::default());
    config.set_paused(true);

    let sys = two_body_system(100.0, 1.0e16, 1.0e16);
    let scheduler = Scheduler::new(sys, Box::new(Gravity::default()), config.clone());
    let handle = scheduler.spawn().unwrap();

    thread::sleep(Duration::from_millis(50));
    config.stop();

    let start = Instant::now();
    handle.join().unwrap().unwrap();
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "scheduler did not observe stop promptly"
    );
}

#[test]
fn failing_sink_is_fatal_for_the_loop() {
    let config = Arc::new(SimulationConfig::new(1.0e-6, 1, 1000.0));
    let sys = two_body_system(100.0, 1.0e16, 1.0e16);
    let mut scheduler =
        Scheduler::new(sys, Box::new(Fall::default()), config).with_per_iteration_sink(FailingSink);

    let err = scheduler.run_once().unwrap_err();
    assert!(err.to_string().contains("failing_sink"));
}

#[test]
fn config_setters_reject_invalid_values() {
    let config = SimulationConfig::new(0.001, 10, 1.0);

    config.set_tick_step(-0.5);
    config.set_tick_step(0.0);
    config.set_render_to_simulation_ratio(0);
    config.set_simulation_to_reality_ratio(-2.0);

    assert_eq!(config.tick_step(), 0.001);
    assert_eq!(config.render_to_simulation_ratio(), 10);
    assert_eq!(config.simulation_to_reality_ratio(), 1.0);

    config.set_tick_step(0.01);
    assert_eq!(config.tick_step(), 0.01);
}

// ==================================================================================
// Sink tests
// ==================================================================================

#[test]
fn trajectory_recorder_is_bounded() {
    let mut recorder = TrajectoryRecorder::new(3);
    let mut sys = two_body_system(100.0, 1.0e16, 1.0e16);
    sys.bodies[0].v = NVec2::new(100.0, 0.0);

    for _ in 0..10 {
        recorder.render(&sys.bodies).unwrap();
        // Move far enough that the segment survives rounding
        let dx = sys.bodies[0].v * 0.1;
        sys.bodies[0].x += dx;
    }

    assert_eq!(recorder.len(), 3);
    assert!(recorder.segments().count() > 0);
}

#[test]
fn trajectory_recorder_skips_static_bodies() {
    let mut recorder = TrajectoryRecorder::new(10);
    let sys = two_body_system(100.0, 1.0e16, 1.0e16);

    for _ in 0..5 {
        recorder.render(&sys.bodies).unwrap();
    }

    // Batches are recorded but no segments: nothing moved
    assert_eq!(recorder.segments().count(), 0);
}

// ==================================================================================
// Scenario tests
// ==================================================================================

#[test]
fn scenario_builds_from_yaml_with_orbit_velocity() {
    let yaml = r#"
integrator: "gravity"
parameters:
  tick_step: 0.001
  render_to_simulation_ratio: 10
  simulation_to_reality_ratio: 1.0
bodies:
  - x: [0.0, 0.0]
    v: [0.0, -1.5]
    m: 1.0e17
  - x: [300.0, 0.0]
    v: [0.0, 0.0]
    m: 1.0e15
    orbit_around: 0
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.system.bodies.len(), 2);
    assert_eq!(scenario.config.tick_step(), 0.001);

    // Circular-orbit speed around the central mass, stacked on its drift
    let expected = -1.5 + (GRAVITATIONAL_CONSTANT * 1.0e17 / 300.0).sqrt();
    let vy = scenario.system.bodies[1].v.y;
    assert!((vy - expected).abs() < 1.0e-9, "expected vy {expected}, got {vy}");
}

#[test]
fn scenario_rejects_structural_violations() {
    let no_bodies = r#"
integrator: "gravity"
parameters:
  tick_step: 0.001
  render_to_simulation_ratio: 10
  simulation_to_reality_ratio: 1.0
bodies: []
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(no_bodies).unwrap();
    assert!(Scenario::build_scenario(cfg).is_err());

    let bad_mass = r#"
integrator: "fall"
parameters:
  tick_step: 0.001
  render_to_simulation_ratio: 10
  simulation_to_reality_ratio: 1.0
bodies:
  - x: [0.0, 0.0]
    v: [0.0, 0.0]
    m: -1.0
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(bad_mass).unwrap();
    let err = Scenario::build_scenario(cfg).map(|_| ()).unwrap_err();
    assert!(err.to_string().contains("mass"));

    let bad_step = r#"
integrator: "fall"
parameters:
  tick_step: 0.0
  render_to_simulation_ratio: 10
  simulation_to_reality_ratio: 1.0
bodies:
  - x: [0.0, 0.0]
    v: [0.0, 0.0]
    m: 1.0
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(bad_step).unwrap();
    assert!(Scenario::build_scenario(cfg).is_err());
}
