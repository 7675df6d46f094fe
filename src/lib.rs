pub mod benchmark;
pub mod configuration;
pub mod simulation;

pub use simulation::states::{Body, NVec2, System};
pub use simulation::forces::{NewtonianGravity, DISTANCE_MIN, GRAVITATIONAL_CONSTANT};
pub use simulation::integrator::{Fall, Gravity, Integrator};
pub use simulation::scheduler::{Scheduler, SimulationConfig, PAUSE_CHECK_INTERVAL};
pub use simulation::sink::{LogSink, RenderSink, Segment, TrajectoryRecorder};
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, IntegratorConfig, ParametersConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_ticks};
