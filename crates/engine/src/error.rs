//! Error types for the recommendation engine.

use data_loader::CustomerId;
use thiserror::Error;

/// Errors surfaced by the engine's boundary calls.
///
/// These are all terminal for the request: nothing here is retried
/// internally. Degenerate similarity (a zero-norm item vector) is
/// deliberately NOT an error; it is resolved locally as similarity 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The requested customer has no entry in the interaction matrix.
    /// Distinct from an empty-but-valid recommendation list.
    #[error("Unknown customer {customer_id}: no purchase history in this snapshot")]
    UnknownCustomer { customer_id: CustomerId },

    /// top_n must be at least 1
    #[error("Invalid top_n: expected a positive count, got {got}")]
    InvalidTopN { got: usize },

    /// The similarity computation observed its cancellation token
    /// between tiles and stopped early.
    #[error("Similarity computation cancelled")]
    Cancelled,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
