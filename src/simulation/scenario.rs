//! Build fully-initialized simulation scenarios from configuration.
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! system state with bodies at t = 0, the chosen integrator, and the shared
//! scheduler configuration. All structural validation happens here, so the
//! integrator and scheduler never see an empty system, a non-positive mass,
//! or a non-positive step or ratio.

use anyhow::{ensure, Result};
use std::sync::Arc;

use crate::configuration::config::{IntegratorConfig, ScenarioConfig};
use crate::simulation::forces::{NewtonianGravity, DISTANCE_MIN, GRAVITATIONAL_CONSTANT};
use crate::simulation::integrator::{Fall, Gravity, Integrator};
use crate::simulation::scheduler::SimulationConfig;
use crate::simulation::states::{Body, NVec2, System};

/// Retained trajectory batches when the scenario does not say otherwise.
const DEFAULT_TRAJECTORY_FADE_OUT_COUNT: usize = 4000;

/// A fully-initialized runtime scenario, ready to hand to a `Scheduler`.
pub struct Scenario {
    pub system: System,
    pub integrator: Box<dyn Integrator>,
    pub config: Arc<SimulationConfig>,
    pub trajectory_fade_out_count: usize,
}

impl Scenario {
    /// Validate a `ScenarioConfig` and map it into runtime types.
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let p = &cfg.parameters;
        ensure!(p.tick_step > 0.0, "tick_step must be positive, got {}", p.tick_step);
        ensure!(
            p.render_to_simulation_ratio >= 1,
            "render_to_simulation_ratio must be at least 1"
        );
        ensure!(
            p.simulation_to_reality_ratio > 0.0,
            "simulation_to_reality_ratio must be positive, got {}",
            p.simulation_to_reality_ratio
        );
        ensure!(!cfg.bodies.is_empty(), "scenario contains no bodies");

        let g = p.g.unwrap_or(GRAVITATIONAL_CONSTANT);
        let distance_min = p.distance_min.unwrap_or(DISTANCE_MIN);
        ensure!(g > 0.0, "gravitational constant must be positive, got {g}");
        ensure!(
            distance_min > 0.0,
            "distance_min must be positive, got {distance_min}"
        );

        // Bodies are built in order so an `orbit_around` reference can read
        // the already-derived velocity of its parent
        let mut bodies: Vec<Body> = Vec::with_capacity(cfg.bodies.len());
        for (i, bc) in cfg.bodies.iter().enumerate() {
            ensure!(bc.m > 0.0, "body {i} has non-positive mass {}", bc.m);

            let x = NVec2::new(bc.x[0], bc.x[1]);
            let mut v = NVec2::new(bc.v[0], bc.v[1]);

            if let Some(parent) = bc.orbit_around {
                ensure!(
                    parent < i,
                    "body {i}: orbit_around must reference an earlier body, got {parent}"
                );
                let pb = &bodies[parent];
                let r = (pb.x - x).norm();
                ensure!(
                    r > 0.0,
                    "body {i}: coincides with orbit_around body {parent}"
                );
                // Circular-orbit speed around the parent, stacked on the
                // parent's own vertical velocity
                v.y = pb.v.y + (g * pb.m / r).sqrt();
            }

            bodies.push(Body { x, v, m: bc.m });
        }

        let system = System { bodies, t: 0.0 };

        let integrator: Box<dyn Integrator> = match cfg.integrator {
            IntegratorConfig::Fall => Box::new(Fall::default()),
            IntegratorConfig::Gravity => Box::new(Gravity {
                forces: NewtonianGravity { g, distance_min },
            }),
        };

        let config = Arc::new(SimulationConfig::new(
            p.tick_step,
            p.render_to_simulation_ratio,
            p.simulation_to_reality_ratio,
        ));

        Ok(Self {
            system,
            integrator,
            config,
            trajectory_fade_out_count: p
                .trajectory_fade_out_count
                .unwrap_or(DEFAULT_TRAJECTORY_FADE_OUT_COUNT),
        })
    }
}
