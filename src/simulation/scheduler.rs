//! Wall-clock-paced scheduler loop and its shared configuration.
//!
//! The scheduler runs on a dedicated thread and repeatedly performs one
//! pacing iteration: a batch of render-sink notifications, a batch of
//! integrator ticks, then a sleep sized so simulated-time throughput tracks
//! a configured multiple of real time. Configuration lives in
//! [`SimulationConfig`], a set of independently atomic fields mutated at any
//! time by a control surface on another thread.

use crate::simulation::integrator::Integrator;
use crate::simulation::sink::RenderSink;
use crate::simulation::states::System;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long a paused scheduler sleeps between pause-flag checks. Bounds the
/// latency of both unpausing and stopping while paused.
pub const PAUSE_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Cap on a single paced-sleep increment. The remaining budget and the stop
/// flag are re-checked between increments, so a stop request is observed
/// within this bound even under a very large time budget.
const MAX_SLEEP_INCREMENT: Duration = Duration::from_secs(1);

// Floor applied when reading `tick_step`; the setters never admit a
// non-positive value, so this only matters for a config constructed badly.
const MIN_TICK_STEP: f64 = 1e-12;

/// Shared, concurrently-mutable scheduler configuration.
///
/// Each field is an independent atomic read once per use per pacing
/// iteration. A concurrent write therefore applies at the next iteration
/// boundary, never mid-tick, and cross-field consistency within one
/// iteration is deliberately not guaranteed — partial staleness is an
/// accepted tradeoff, not a race.
///
/// Setters are the control surface: they reject non-positive values with a
/// warning and keep the previous value, so the scheduler can never observe
/// an invalid field through this interface.
pub struct SimulationConfig {
    tick_step: AtomicU64,                  // f64 bits; simulated time per tick
    render_to_simulation_ratio: AtomicU32, // ticks per pacing iteration
    simulation_to_reality_ratio: AtomicU64, // f64 bits; simulated/wall-clock target
    paused: AtomicBool,
    stopped: AtomicBool, // cooperative shutdown, observed at sleep boundaries
}

impl SimulationConfig {
    pub fn new(
        tick_step: f64,
        render_to_simulation_ratio: u32,
        simulation_to_reality_ratio: f64,
    ) -> Self {
        Self {
            tick_step: AtomicU64::new(tick_step.to_bits()),
            render_to_simulation_ratio: AtomicU32::new(render_to_simulation_ratio),
            simulation_to_reality_ratio: AtomicU64::new(simulation_to_reality_ratio.to_bits()),
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn tick_step(&self) -> f64 {
        f64::from_bits(self.tick_step.load(Ordering::Relaxed))
    }

    pub fn set_tick_step(&self, step: f64) {
        if step > 0.0 {
            self.tick_step.store(step.to_bits(), Ordering::Relaxed);
        } else {
            log::warn!("rejecting non-positive tick step {step}");
        }
    }

    pub fn render_to_simulation_ratio(&self) -> u32 {
        self.render_to_simulation_ratio.load(Ordering::Relaxed)
    }

    pub fn set_render_to_simulation_ratio(&self, ratio: u32) {
        if ratio >= 1 {
            self.render_to_simulation_ratio
                .store(ratio, Ordering::Relaxed);
        } else {
            log::warn!("rejecting zero render-to-simulation ratio");
        }
    }

    pub fn simulation_to_reality_ratio(&self) -> f64 {
        f64::from_bits(self.simulation_to_reality_ratio.load(Ordering::Relaxed))
    }

    pub fn set_simulation_to_reality_ratio(&self, ratio: f64) {
        if ratio > 0.0 {
            self.simulation_to_reality_ratio
                .store(ratio.to_bits(), Ordering::Relaxed);
        } else {
            log::warn!("rejecting non-positive simulation-to-reality ratio {ratio}");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Request cooperative shutdown. The scheduler observes this at its next
    /// sleep boundary and exits its loop cleanly.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

impl Default for SimulationConfig {
    /// Defaults: 1 ms tick, 10 ticks per iteration, real-time speed.
    fn default() -> Self {
        Self::new(0.001, 10, 1.0)
    }
}

/// The pacing loop. Owns the body state and the integrator exclusively;
/// render sinks run synchronously on its thread and only ever see a shared
/// slice, so nothing races the integrator's mutation of the bodies.
pub struct Scheduler {
    system: System,
    integrator: Box<dyn Integrator>,
    // Notified once per pacing iteration, regardless of ratio
    per_iteration_sinks: Vec<Box<dyn RenderSink>>,
    // Notified once per simulation tick (ratio times per iteration)
    per_tick_sinks: Vec<Box<dyn RenderSink>>,
    config: Arc<SimulationConfig>,
}

impl Scheduler {
    pub fn new(
        system: System,
        integrator: Box<dyn Integrator>,
        config: Arc<SimulationConfig>,
    ) -> Self {
        Self {
            system,
            integrator,
            per_iteration_sinks: Vec::new(),
            per_tick_sinks: Vec::new(),
            config,
        }
    }

    /// Register a sink notified once per pacing iteration.
    pub fn with_per_iteration_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.per_iteration_sinks.push(Box::new(sink));
        self
    }

    /// Register a sink notified once per simulation tick.
    pub fn with_per_tick_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.per_tick_sinks.push(Box::new(sink));
        self
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn config(&self) -> &Arc<SimulationConfig> {
        &self.config
    }

    /// One pacing iteration. Returns `Ok(false)` once the stop flag has been
    /// observed, `Ok(true)` to keep going.
    ///
    /// Order within an iteration: every sink notification happens strictly
    /// before any integrator tick mutates the bodies, so sinks observe the
    /// state as of the start of the iteration. The paced (or paused) sleep
    /// at the end is the only blocking point and therefore the point where
    /// pause, stop, and ratio changes take effect.
    pub fn run_once(&mut self) -> Result<bool> {
        let start = Instant::now();

        if self.config.is_stopped() {
            return Ok(false);
        }
        if self.config.is_paused() {
            thread::sleep(PAUSE_CHECK_INTERVAL);
            return Ok(true);
        }

        // Fields are read once per iteration; a concurrent change waits for
        // the next iteration. Reads are clamped so a value that predates the
        // validating setters can still never divide by zero here.
        let step = self.config.tick_step().max(MIN_TICK_STEP);
        let ratio = self.config.render_to_simulation_ratio().max(1);
        let speed = self.config.simulation_to_reality_ratio();
        let speed = if speed > 0.0 { speed } else { 1.0 };

        for sink in self.per_iteration_sinks.iter_mut() {
            sink.render(&self.system.bodies)
                .with_context(|| format!("render sink `{}` failed", sink.name()))?;
        }

        // Per-tick sinks are notified as one batch before the tick batch,
        // mirroring the iteration's read-then-mutate ordering
        for _ in 0..ratio {
            for sink in self.per_tick_sinks.iter_mut() {
                sink.render(&self.system.bodies)
                    .with_context(|| format!("render sink `{}` failed", sink.name()))?;
            }
        }

        for _ in 0..ratio {
            self.integrator.tick(&mut self.system, step);
        }

        // Wall-clock time this iteration should have taken to hold the
        // configured speed ratio
        let budget = Duration::from_secs_f64(step * f64::from(ratio) / speed);

        let elapsed = start.elapsed();
        if elapsed >= budget {
            // Falling behind: the work alone exhausted the budget. Not an
            // error, just a reduced effective speed ratio.
            log::debug!(
                "pacing iteration over budget: {:?} elapsed, {:?} budgeted",
                elapsed,
                budget
            );
            return Ok(true);
        }

        // Sleep off the remainder in bounded increments so a stop request
        // never waits longer than one increment
        loop {
            let spent = start.elapsed();
            if spent >= budget {
                break;
            }
            if self.config.is_stopped() {
                return Ok(false);
            }
            thread::sleep((budget - spent).min(MAX_SLEEP_INCREMENT));
        }

        Ok(true)
    }

    /// Run pacing iterations until stopped or a sink error propagates.
    ///
    /// The loop has no normal exit of its own; it ends only through the
    /// cooperative stop flag or a fatal error, which is returned rather than
    /// retried so a failing collaborator cannot silently corrupt state.
    pub fn run(mut self) -> Result<()> {
        log::info!(
            "scheduler running: {} bodies, tick step {}, ratio {}, speed {}",
            self.system.bodies.len(),
            self.config.tick_step(),
            self.config.render_to_simulation_ratio(),
            self.config.simulation_to_reality_ratio(),
        );
        while self.run_once()? {}
        log::info!("scheduler stopped at simulated time {:.6}", self.system.t);
        Ok(())
    }

    /// Move the scheduler onto a named background thread.
    pub fn spawn(self) -> Result<thread::JoinHandle<Result<()>>> {
        thread::Builder::new()
            .name("bodysim-scheduler".into())
            .spawn(move || self.run())
            .context("failed to spawn scheduler thread")
    }
}
