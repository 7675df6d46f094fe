pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod scheduler;
pub mod sink;
pub mod states;
