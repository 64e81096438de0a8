pub mod assumptions;
pub mod engine;
pub mod summary;

pub use assumptions::*;
pub use engine::{project, ProjectionInput, ProjectionOutput, YearlyResult};
pub use summary::ComparisonSummary;
