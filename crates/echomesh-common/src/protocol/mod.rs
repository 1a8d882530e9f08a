pub mod correlation;
pub mod error;
pub mod outcome;

pub use correlation::{format_correlation_id, next_correlation_id, CorrelationId};
pub use error::{MeshError, Result};
pub use outcome::DispatchOutcome;
