//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Panics are the fourth, crash-class fault; they are never converted into
/// a `DomainError`.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Malformed or missing input, detected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A business rule inside an aggregate would be broken.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Storage or broker failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
