pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "acquisition_tax")]
pub mod acquisition_tax;

#[cfg(feature = "retirement")]
pub mod retirement;

pub use error::PlannerError;
pub use types::*;

/// Standard result type for all planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
