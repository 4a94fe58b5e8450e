//! Item-item cosine similarity over the binary interaction matrix.
//!
//! For binary occurrence vectors the cosine reduces to
//! `co(i, j) / (sqrt(n_i) * sqrt(n_j))` where `co` is the number of
//! customers who bought both items and `n_i` is the number of customers
//! who bought item i. So instead of a dense items×customers product we
//! compute co-purchase counts by walking the sparse structure: for each
//! item, visit its customers, and for each customer their other items.
//!
//! ## Tiling
//! The item axis is split into fixed-size tiles of rows. Tiles have no
//! dependency on each other, so they are computed on the rayon pool and
//! merged by concatenation. This is the dominant cost of a snapshot
//! rebuild (catalogs run to thousands of items, customer bases to tens
//! of thousands), and it is the one step that honors cancellation:
//! the token is checked once per tile.

use crate::error::{EngineError, Result};
use crate::interaction::InteractionMatrix;
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Cooperative cancellation signal for snapshot rebuilds.
///
/// Cheap to clone; hand one half to the rebuild and keep the other to
/// abort it when the caller goes away.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Dense, symmetric item×item similarity matrix.
///
/// Row-major storage; the row for item i is the similarity of i to
/// every item including itself. Entries are in [0, 1]. Recomputed in
/// full on every snapshot build, never patched in place.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    num_items: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build from pre-computed row-major entries. The scorer tests use
    /// this to pin exact similarity values.
    pub fn from_dense(num_items: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), num_items * num_items);
        Self { num_items, data }
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Similarity of item `i` to every item (including itself).
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.num_items..(i + 1) * self.num_items]
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.num_items + j]
    }
}

/// Computes the similarity matrix from an interaction matrix.
pub struct SimilarityEngine {
    tile_size: usize,
}

impl SimilarityEngine {
    /// Item rows per parallel tile. Small enough to load-balance across
    /// the pool, big enough that the per-tile accumulator amortizes.
    pub const DEFAULT_TILE_SIZE: usize = 256;

    pub fn new() -> Self {
        Self {
            tile_size: Self::DEFAULT_TILE_SIZE,
        }
    }

    /// Configure the tile size (rows of the item axis per work unit).
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    /// Compute the full item-item similarity matrix.
    pub fn compute(&self, matrix: &InteractionMatrix) -> SimilarityMatrix {
        let start = Instant::now();
        let norms = Self::item_norms(matrix);

        let tiles: Vec<Vec<f32>> = self
            .tiles(matrix.num_items())
            .into_par_iter()
            .map(|tile| Self::compute_tile(matrix, &norms, tile))
            .collect();
        let data = tiles.concat();

        debug!(
            "Computed {}x{} similarity matrix over {} customers in {:.2?}",
            matrix.num_items(),
            matrix.num_items(),
            matrix.num_customers(),
            start.elapsed()
        );
        SimilarityMatrix {
            num_items: matrix.num_items(),
            data,
        }
    }

    /// Like [`compute`](Self::compute), but checks `cancel` between
    /// tiles and returns [`EngineError::Cancelled`] if it fires.
    pub fn compute_with_cancel(
        &self,
        matrix: &InteractionMatrix,
        cancel: &CancelToken,
    ) -> Result<SimilarityMatrix> {
        let norms = Self::item_norms(matrix);

        let tiles: Vec<Vec<f32>> = self
            .tiles(matrix.num_items())
            .into_par_iter()
            .map(|tile| {
                if cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                Ok(Self::compute_tile(matrix, &norms, tile))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SimilarityMatrix {
            num_items: matrix.num_items(),
            data: tiles.concat(),
        })
    }

    /// Vector norm per item: sqrt of its customer count.
    fn item_norms(matrix: &InteractionMatrix) -> Vec<f32> {
        (0..matrix.num_items())
            .map(|i| (matrix.customers_of(i).len() as f32).sqrt())
            .collect()
    }

    /// Split the item axis into row ranges of at most `tile_size`.
    fn tiles(&self, num_items: usize) -> Vec<Range<usize>> {
        (0..num_items)
            .step_by(self.tile_size)
            .map(|start| start..(start + self.tile_size).min(num_items))
            .collect()
    }

    /// Compute the dense similarity rows for one tile of items.
    fn compute_tile(
        matrix: &InteractionMatrix,
        norms: &[f32],
        tile: Range<usize>,
    ) -> Vec<f32> {
        let num_items = matrix.num_items();
        let mut out = vec![0.0f32; tile.len() * num_items];
        let mut counts = vec![0u32; num_items];

        for (local, i) in tile.enumerate() {
            counts.fill(0);
            // Co-purchase counts: one sparse row of (A^T A).
            for &customer in matrix.customers_of(i) {
                for &j in matrix.items_of(customer as usize) {
                    counts[j as usize] += 1;
                }
            }

            let row = &mut out[local * num_items..(local + 1) * num_items];
            let norm_i = norms[i];
            if norm_i == 0.0 {
                // Zero-norm vector: similarity is defined as 0, never
                // a division error. Cannot occur for a built matrix,
                // but the row stays all-zero if it does.
                continue;
            }
            for (j, &count) in counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let norm_j = norms[j];
                if norm_j == 0.0 {
                    continue;
                }
                // Clamp: float rounding may nudge 1.0 upward.
                row[j] = (count as f32 / (norm_i * norm_j)).min(1.0);
            }
        }
        out
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionMatrixBuilder;
    use data_loader::PurchaseEvent;

    fn build_matrix(pairs: &[(u32, &str)]) -> InteractionMatrix {
        let events: Vec<PurchaseEvent> = pairs
            .iter()
            .map(|&(c, i)| PurchaseEvent::new(c, i, 1))
            .collect();
        InteractionMatrixBuilder::build(&events)
    }

    #[test]
    fn test_empty_matrix_empty_similarity() {
        let matrix = InteractionMatrixBuilder::build(&[]);
        let similarity = SimilarityEngine::new().compute(&matrix);
        assert!(similarity.is_empty());
        assert_eq!(similarity.num_items(), 0);
    }

    #[test]
    fn test_cosine_values() {
        // A bought by {1, 2, 3}, B bought by {1, 2}, C bought by {3}.
        let matrix = build_matrix(&[
            (1, "A"),
            (1, "B"),
            (2, "A"),
            (2, "B"),
            (3, "A"),
            (3, "C"),
        ]);
        let similarity = SimilarityEngine::new().compute(&matrix);

        let a = matrix.item_index("A").unwrap();
        let b = matrix.item_index("B").unwrap();
        let c = matrix.item_index("C").unwrap();

        // sim(A, B) = 2 / (sqrt(3) * sqrt(2))
        let expected_ab = 2.0 / (3.0f32.sqrt() * 2.0f32.sqrt());
        assert!((similarity.get(a, b) - expected_ab).abs() < 1e-6);
        // sim(A, C) = 1 / sqrt(3)
        let expected_ac = 1.0 / 3.0f32.sqrt();
        assert!((similarity.get(a, c) - expected_ac).abs() < 1e-6);
        // B and C share no customers.
        assert_eq!(similarity.get(b, c), 0.0);
        // Self-similarity is exactly 1 for items with purchases.
        assert_eq!(similarity.get(a, a), 1.0);
        assert_eq!(similarity.get(c, c), 1.0);
    }

    #[test]
    fn test_symmetry_and_range() {
        let matrix = build_matrix(&[
            (1, "A"),
            (1, "B"),
            (1, "C"),
            (2, "B"),
            (2, "C"),
            (3, "A"),
            (3, "C"),
            (4, "D"),
        ]);
        let similarity = SimilarityEngine::new().compute(&matrix);

        for i in 0..similarity.num_items() {
            for j in 0..similarity.num_items() {
                let s = similarity.get(i, j);
                assert!((0.0..=1.0).contains(&s), "sim({i},{j}) = {s} out of range");
                assert_eq!(s, similarity.get(j, i), "sim({i},{j}) asymmetric");
            }
        }
    }

    #[test]
    fn test_tile_size_does_not_change_result() {
        let matrix = build_matrix(&[
            (1, "A"),
            (1, "B"),
            (2, "A"),
            (2, "C"),
            (3, "B"),
            (3, "C"),
            (4, "A"),
        ]);
        let whole = SimilarityEngine::new().compute(&matrix);
        let tiled = SimilarityEngine::new().with_tile_size(1).compute(&matrix);

        for i in 0..matrix.num_items() {
            assert_eq!(whole.row(i), tiled.row(i));
        }
    }

    #[test]
    fn test_cancellation() {
        let matrix = build_matrix(&[(1, "A"), (1, "B"), (2, "B")]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = SimilarityEngine::new().compute_with_cancel(&matrix, &cancel);
        assert_eq!(result.unwrap_err(), EngineError::Cancelled);
    }

    #[test]
    fn test_uncancelled_token_matches_plain_compute() {
        let matrix = build_matrix(&[(1, "A"), (1, "B"), (2, "B"), (2, "C")]);
        let engine = SimilarityEngine::new();
        let plain = engine.compute(&matrix);
        let with_token = engine
            .compute_with_cancel(&matrix, &CancelToken::new())
            .unwrap();

        for i in 0..matrix.num_items() {
            assert_eq!(plain.row(i), with_token.row(i));
        }
    }
}
