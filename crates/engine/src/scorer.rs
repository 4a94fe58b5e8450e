//! Turns a customer's purchase history into a ranked candidate list.
//!
//! ## Algorithm
//! 1. Look up the customer's purchased item set P
//! 2. For each p in P: take its similarity row, drop p itself and
//!    zero-similarity entries, keep the top_n nearest neighbours
//! 3. Candidates outside P accumulate their similarity scores, summed
//!    across every purchased item that proposed them
//! 4. Rank by aggregate score descending, item id ascending on ties,
//!    and truncate to top_n
//!
//! The tie-break is deliberate: aggregation runs through a HashMap, and
//! without an explicit secondary key equal-scored items would surface
//! in traversal order, which varies run to run.

use crate::error::{EngineError, Result};
use crate::interaction::InteractionMatrix;
use crate::similarity::SimilarityMatrix;
use data_loader::CustomerId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One ranked candidate item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: String,
    /// Similarity mass summed across the purchased items that proposed
    /// this candidate. Comparable within one result, not across runs.
    pub score: f32,
}

/// Scores and ranks candidates for one customer against one snapshot.
pub struct RecommendationScorer;

impl RecommendationScorer {
    /// Produce at most `top_n` recommendations for `customer_id`.
    ///
    /// # Errors
    /// - [`EngineError::InvalidTopN`] if `top_n` is 0
    /// - [`EngineError::UnknownCustomer`] if the customer has no row in
    ///   `matrix` (never silently returned as an empty list)
    ///
    /// A customer present with an empty purchase set gets an empty,
    /// valid result.
    pub fn recommend(
        customer_id: CustomerId,
        matrix: &InteractionMatrix,
        similarity: &SimilarityMatrix,
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        if top_n == 0 {
            return Err(EngineError::InvalidTopN { got: top_n });
        }
        let customer = matrix
            .customer_index(customer_id)
            .ok_or(EngineError::UnknownCustomer { customer_id })?;

        let purchased = matrix.items_of(customer);
        if purchased.is_empty() {
            return Ok(Vec::new());
        }
        let purchased_set: HashSet<u32> = purchased.iter().copied().collect();

        // Each purchased item proposes its nearest neighbours.
        let mut aggregate: HashMap<u32, f32> = HashMap::new();
        for &p in purchased {
            let row = similarity.row(p as usize);
            let mut neighbours: Vec<(u32, f32)> = row
                .iter()
                .enumerate()
                .filter(|&(j, &sim)| j != p as usize && sim > 0.0)
                .map(|(j, &sim)| (j as u32, sim))
                .collect();
            // Item indices follow ascending item-id order, so the index
            // tie-break below is an id tie-break.
            neighbours.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            neighbours.truncate(top_n);

            for (candidate, sim) in neighbours {
                if !purchased_set.contains(&candidate) {
                    *aggregate.entry(candidate).or_insert(0.0) += sim;
                }
            }
        }

        let mut ranked: Vec<(u32, f32)> = aggregate.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_n);

        debug!(
            "Customer {}: {} purchased items produced {} recommendations",
            customer_id,
            purchased.len(),
            ranked.len()
        );

        Ok(ranked
            .into_iter()
            .map(|(idx, score)| Recommendation {
                item_id: matrix.item_id(idx as usize).to_string(),
                score,
            })
            .collect())
    }
}
