//! Wall-clock throughput benches for the force computation and integrator.
//!
//! Run with `bodysim --bench`. Prints per-size timings for the direct N^2
//! force accumulation and for full gravity ticks.

use std::time::Instant;

use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::{Gravity, Integrator};
use crate::simulation::states::{Body, NVec2, System};

/// Deterministic test system, no rand needed.
fn build_system(n: usize) -> System {
    let mut bodies = Vec::with_capacity(n);
    for i in 0..n {
        let i_f = i as f64;
        bodies.push(Body {
            x: NVec2::new((i_f * 0.37).sin() * 500.0, (i_f * 0.13).cos() * 500.0),
            v: NVec2::zeros(),
            m: 1.0e16,
        });
    }
    System { bodies, t: 0.0 }
}

pub fn bench_gravity() {
    let ns = [4, 8, 16, 32, 64, 128];
    let repeats = 1000;

    println!("force accumulation, {repeats} repeats per size");
    for n in ns {
        let sys = build_system(n);
        let forces = NewtonianGravity::default();
        let mut out = vec![NVec2::zeros(); n];

        let start = Instant::now();
        for _ in 0..repeats {
            forces.accumulate_forces(&sys, &mut out);
        }
        let elapsed = start.elapsed();

        println!(
            "  n = {n:4}: {:>10.3?} total, {:>8.1} ns/call",
            elapsed,
            elapsed.as_nanos() as f64 / repeats as f64
        );
    }
}

pub fn bench_ticks() {
    let ns = [4, 8, 16, 32, 64, 128];
    let ticks = 10_000;
    let step = 1.0e-4;

    println!("gravity integrator, {ticks} ticks per size");
    for n in ns {
        let mut sys = build_system(n);
        let integrator = Gravity::default();

        let start = Instant::now();
        for _ in 0..ticks {
            integrator.tick(&mut sys, step);
        }
        let elapsed = start.elapsed();

        println!(
            "  n = {n:4}: {:>10.3?} total, {:>8.1} ticks/ms",
            elapsed,
            ticks as f64 / elapsed.as_secs_f64() / 1000.0
        );
    }
}
