//! Immutable snapshots and the build-then-swap store.
//!
//! A [`Snapshot`] couples one interaction matrix with the similarity
//! matrix computed from it. It is built once per data refresh and never
//! mutated, so any number of recommendation requests can read it
//! concurrently without locking. Refreshing is build-then-swap: the new
//! snapshot is built off to the side and only then installed in the
//! [`SnapshotStore`], so readers see either the old complete snapshot
//! or the new one, never a half-built state.

use crate::error::Result;
use crate::interaction::{InteractionMatrix, InteractionMatrixBuilder};
use crate::scorer::{Recommendation, RecommendationScorer};
use crate::similarity::{CancelToken, SimilarityEngine, SimilarityMatrix};
use data_loader::{CustomerId, PurchaseEvent};
use std::sync::{Arc, RwLock};
use tracing::info;

/// One immutable (interaction, similarity) pair.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    interactions: InteractionMatrix,
    similarity: SimilarityMatrix,
}

impl Snapshot {
    /// Build a snapshot from a purchase-event stream.
    pub fn build(events: &[PurchaseEvent]) -> Self {
        let interactions = InteractionMatrixBuilder::build(events);
        let similarity = SimilarityEngine::new().compute(&interactions);
        info!(
            "Built snapshot: {} customers, {} items",
            interactions.num_customers(),
            interactions.num_items()
        );
        Self {
            interactions,
            similarity,
        }
    }

    /// Build a snapshot, honoring cancellation during the similarity
    /// computation (the step that dominates rebuild latency).
    pub fn build_with_cancel(
        events: &[PurchaseEvent],
        engine: &SimilarityEngine,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let interactions = InteractionMatrixBuilder::build(events);
        let similarity = engine.compute_with_cancel(&interactions, cancel)?;
        Ok(Self {
            interactions,
            similarity,
        })
    }

    /// The engine's boundary call: ranked top-N candidates for one
    /// customer against this snapshot.
    pub fn recommend(
        &self,
        customer_id: CustomerId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        RecommendationScorer::recommend(customer_id, &self.interactions, &self.similarity, top_n)
    }

    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}

/// Holds the currently-served snapshot behind an atomic swap point.
///
/// Readers `load()` an `Arc` and keep using it for the whole request;
/// a refresh `replace()`s the Arc without disturbing them.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Get the currently-installed snapshot.
    pub fn load(&self) -> Arc<Snapshot> {
        // A poisoned lock only ever guards a fully-built Arc, so the
        // value is still safe to hand out.
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Install a freshly-built snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
