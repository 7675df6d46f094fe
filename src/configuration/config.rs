//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`IntegratorConfig`] – which integrator advances the bodies
//! - [`ParametersConfig`] – step size, pacing ratios, force constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! integrator: "gravity"    # or "fall"
//!
//! parameters:
//!   tick_step: 0.001                  # simulated seconds per integrator tick
//!   render_to_simulation_ratio: 10    # ticks per pacing iteration
//!   simulation_to_reality_ratio: 1.0  # 1.0 = real time, 10.0 = 10x faster
//!   g: 6.674e-11                      # optional, gravitational constant
//!   distance_min: 50.0                # optional, softening floor on |r|^3
//!   trajectory_fade_out_count: 4000   # optional, trajectory history cap
//!
//! bodies:
//!   - x: [0.0, 0.0]
//!     v: [0.0, -1.5]
//!     m: 1.0e17
//!   - x: [300.0, 0.0]
//!     v: [0.0, 0.0]
//!     m: 1.0e15
//!     orbit_around: 0    # optional: derive circular-orbit velocity around body 0
//! ```
//!
//! The scenario builder maps this configuration into the runtime types and
//! rejects structurally invalid input (no bodies, non-positive masses, steps
//! or ratios) with descriptive errors.

use serde::Deserialize;

/// Which integrator advances the system.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "fall")] // constant downward acceleration, no interaction
    Fall,

    #[serde(rename = "gravity")] // pairwise Newtonian attraction
    Gravity,
}

/// Numerical parameters, pacing ratios, and force constants.
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub tick_step: f64,                  // simulated time per integrator tick
    pub render_to_simulation_ratio: u32, // ticks per pacing iteration
    pub simulation_to_reality_ratio: f64, // target simulated/wall-clock ratio
    pub g: Option<f64>,                  // gravitational constant override
    pub distance_min: Option<f64>,       // softening floor on the cubed distance
    pub trajectory_fade_out_count: Option<usize>, // trajectory history cap
}

/// Initial state for a single body.
#[derive(Deserialize, Debug)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position
    pub v: [f64; 2], // initial velocity
    pub m: f64,      // mass, must be positive
    /// Index of an earlier body to orbit. When set, the vertical velocity is
    /// derived as `parent_vy + sqrt(g * parent_mass / separation)` — the
    /// circular-orbit speed around that body — instead of taking `v[1]`
    /// literally.
    pub orbit_around: Option<usize>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub integrator: IntegratorConfig,
    pub parameters: ParametersConfig,
    pub bodies: Vec<BodyConfig>,
}
