//! Core state types for the N-body simulation.
//!
//! Defines the point-mass `Body` and the `System` that owns the body list
//! together with the accumulated simulated time `t`.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// A single point mass.
///
/// Invariant: `m > 0` for the lifetime of the body. Force-to-acceleration
/// conversion divides by `m`, so scenario construction rejects non-positive
/// masses before a `Body` ever reaches an integrator.
#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64,   // mass
}

/// The full simulation state: every body plus the simulated time.
///
/// Bodies are created once at scenario setup, mutated in place every
/// integrator tick, and never removed during a run.
#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies
    pub t: f64,            // simulated time
}
