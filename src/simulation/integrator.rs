//! Fixed-step time integrators.
//!
//! An `Integrator` advances every body's velocity and then position by one
//! unit of simulated time. Two variants exist: constant downward `Fall`
//! (cheap reference variant) and pairwise Newtonian `Gravity`. Both are
//! stateless between calls; all state lives in the `System`.

use crate::simulation::forces::NewtonianGravity;
use crate::simulation::states::{NVec2, System};

/// One discrete time-step advance of the system.
///
/// Implementations mutate velocities and positions in place and advance
/// `sys.t` by `step`. They perform no I/O and never block.
pub trait Integrator: Send {
    fn tick(&self, sys: &mut System, step: f64);
}

/// Constant downward acceleration, no pairwise interaction.
pub struct Fall {
    pub g: f64, // downward acceleration, units/s^2
}

impl Default for Fall {
    fn default() -> Self {
        Self { g: 10.0 }
    }
}

impl Integrator for Fall {
    fn tick(&self, sys: &mut System, step: f64) {
        for b in sys.bodies.iter_mut() {
            b.v.y += step * self.g;
            b.x.y -= b.v.y * step;
        }
        sys.t += step;
    }
}

/// Pairwise Newtonian gravity, semi-implicit (symplectic) Euler.
pub struct Gravity {
    pub forces: NewtonianGravity,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            forces: NewtonianGravity::default(),
        }
    }
}

impl Integrator for Gravity {
    /// Two-phase update. Every force comes from the position snapshot taken
    /// before this tick mutates anything: first all forces are accumulated
    /// and all velocities updated (`v += step * f / m`), only then do all
    /// positions advance (`x += v * step`). Moving a position before every
    /// force is in would corrupt the force on later bodies within the same
    /// tick.
    fn tick(&self, sys: &mut System, step: f64) {
        let n = sys.bodies.len();

        // f[i] holds the net force on body i at the pre-tick positions
        let mut forces = vec![NVec2::zeros(); n];
        self.forces.accumulate_forces(sys, &mut forces);

        // Kick: v_i += step * f_i / m_i
        for (b, f) in sys.bodies.iter_mut().zip(forces.iter()) {
            b.v += step * *f / b.m;
        }

        // Drift: x_i += v_i * step, using the freshly updated velocities
        for b in sys.bodies.iter_mut() {
            b.x += b.v * step;
        }

        sys.t += step;
    }
}
