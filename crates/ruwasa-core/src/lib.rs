pub mod error;
pub mod projection;
pub mod time_value;
pub mod types;

#[cfg(feature = "monte_carlo")]
pub mod sensitivity;

#[cfg(feature = "design")]
pub mod design;

pub use error::RuwasaError;
pub use types::*;

/// Standard result type for all ruwasa operations
pub type RuwasaResult<T> = Result<T, RuwasaError>;
