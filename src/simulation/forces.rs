//! Pairwise gravitational force accumulation.
//!
//! Direct N^2 Newtonian gravity with a softening floor on the cubed
//! separation distance, consumed by the `Gravity` integrator.

use crate::simulation::states::{NVec2, System};

/// CODATA gravitational constant, m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Softening floor applied to the CUBED separation distance in the force
/// law. Below this value the force is computed as if the cubed distance
/// were exactly `DISTANCE_MIN`, which caps the force magnitude as two
/// bodies approach coincidence instead of letting it blow up toward the
/// singularity. Close-range attraction is slightly weakened as a result.
pub const DISTANCE_MIN: f64 = 50.0;

/// Direct Newtonian gravity with a cubed-distance softening floor.
pub struct NewtonianGravity {
    pub g: f64,            // gravitational constant
    pub distance_min: f64, // softening floor on |r|^3
}

impl Default for NewtonianGravity {
    fn default() -> Self {
        Self {
            g: GRAVITATIONAL_CONSTANT,
            distance_min: DISTANCE_MIN,
        }
    }
}

impl NewtonianGravity {
    /// Accumulate the net force on every body into `out`.
    ///
    /// `out[i]` is overwritten with the vector sum over all other bodies j of
    ///
    /// ```text
    /// G * m_i * m_j * (x_j - x_i) / max(|x_j - x_i|^3, distance_min)
    /// ```
    ///
    /// Each unordered pair is visited once and the force applied equal and
    /// opposite, so Newton's third law holds exactly (not merely to
    /// floating-point tolerance).
    pub fn accumulate_forces(&self, sys: &System, out: &mut [NVec2]) {
        let n = sys.bodies.len();

        // Zero buffer
        for f in out.iter_mut() {
            *f = NVec2::zeros();
        }

        for i in 0..n {
            let bi = &sys.bodies[i];

            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // Displacement from i to j; i is pulled along +r, j along -r
                let r = bj.x - bi.x;

                // Softened cubed distance: the floor replaces |r|^3 when the
                // bodies are close, bounding the force magnitude
                let d3 = r.norm().powi(3).max(self.distance_min);

                let coef = self.g * bi.m * bj.m / d3;

                out[i] += coef * r;
                out[j] -= coef * r;
            }
        }
    }
}
