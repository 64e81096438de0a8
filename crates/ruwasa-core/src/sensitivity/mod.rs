pub mod monte_carlo;

pub use monte_carlo::{run_sensitivity, DifferentialBin, SimMetric, SimulationResult};
