//! # Engine Crate
//!
//! Item-based collaborative filtering over a binary purchase matrix.
//!
//! ## Components
//!
//! - **interaction**: [`InteractionMatrixBuilder`] collapses purchase
//!   events into a sparse binary customer×item matrix
//! - **similarity**: [`SimilarityEngine`] computes the symmetric
//!   item×item cosine matrix with a tiled, rayon-parallel product
//! - **scorer**: [`RecommendationScorer`] ranks unseen items for one
//!   customer, with a deterministic score-then-id ordering
//! - **snapshot**: [`Snapshot`] and [`SnapshotStore`] give concurrent
//!   readers an immutable view with build-then-swap refreshes
//!
//! ## Example Usage
//!
//! ```
//! use data_loader::PurchaseEvent;
//! use engine::Snapshot;
//!
//! let events = vec![
//!     PurchaseEvent::new(1, "85123A", 6),
//!     PurchaseEvent::new(1, "71053", 2),
//!     PurchaseEvent::new(2, "85123A", 1),
//! ];
//!
//! let snapshot = Snapshot::build(&events);
//! let recs = snapshot.recommend(2, 5).unwrap();
//! assert_eq!(recs[0].item_id, "71053");
//! ```
//!
//! Everything here recomputes from the event snapshot it is given;
//! there is no incremental update path and no persistence.

// Public modules
pub mod error;
pub mod interaction;
pub mod scorer;
pub mod similarity;
pub mod snapshot;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use interaction::{InteractionMatrix, InteractionMatrixBuilder};
pub use scorer::{Recommendation, RecommendationScorer};
pub use similarity::{CancelToken, SimilarityEngine, SimilarityMatrix};
pub use snapshot::{Snapshot, SnapshotStore};

use data_loader::{CustomerId, PurchaseEvent};

/// One-shot boundary call: build a snapshot from `events` and rank
/// `top_n` candidates for `customer_id` against it.
///
/// Callers serving more than one request should build a [`Snapshot`]
/// once and reuse it; the similarity computation dominates this call.
pub fn recommend_from_events(
    events: &[PurchaseEvent],
    customer_id: CustomerId,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    Snapshot::build(events).recommend(customer_id, top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_boundary_call() {
        let events = vec![
            PurchaseEvent::new(1, "A", 1),
            PurchaseEvent::new(1, "B", 1),
            PurchaseEvent::new(2, "A", 1),
        ];

        let recs = recommend_from_events(&events, 2, 3).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, "B");
    }

    #[test]
    fn test_one_shot_empty_events() {
        let err = recommend_from_events(&[], 1, 3).unwrap_err();
        assert_eq!(err, EngineError::UnknownCustomer { customer_id: 1 });
    }
}
