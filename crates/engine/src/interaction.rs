//! The binary customer×item interaction matrix.
//!
//! Quantity is ignored on purpose: buying the same mug sixty times is
//! still one signal of interest. The matrix is sparse - we store, per
//! customer, the sorted item indices they bought, and per item, the
//! sorted customer indices who bought it. The column lists are what the
//! similarity engine walks; the row lists are what the scorer walks.
//!
//! ## Index order
//! Customers are indexed in ascending numeric id order and items in
//! ascending lexicographic id order. Every downstream ordering
//! (similarity rows, tie-breaks in ranking) leans on this, so two
//! builds over the same events are identical structure for structure.

use data_loader::{CustomerId, PurchaseEvent};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Sparse binary customer×item matrix.
///
/// Immutable once built; only customers and items with at least one
/// purchase event are present, so no row or column is all-zero.
#[derive(Debug, Clone, Default)]
pub struct InteractionMatrix {
    customer_ids: Vec<CustomerId>,
    item_ids: Vec<String>,
    customer_index: HashMap<CustomerId, usize>,
    item_index: HashMap<String, usize>,
    /// Per customer index: sorted, deduplicated item indices.
    rows: Vec<Vec<u32>>,
    /// Per item index: sorted, deduplicated customer indices.
    cols: Vec<Vec<u32>>,
}

/// Builds an [`InteractionMatrix`] from a stream of purchase events.
pub struct InteractionMatrixBuilder;

impl InteractionMatrixBuilder {
    /// Collapse events into the binary matrix.
    ///
    /// Pure function of its input: duplicate (customer, item) pairs
    /// collapse to a single entry, and an empty event sequence yields
    /// an empty matrix (a valid terminal value, not an error).
    pub fn build(events: &[PurchaseEvent]) -> InteractionMatrix {
        // BTreeSet gives us dedup and the ascending id order in one go.
        let mut pairs: BTreeSet<(CustomerId, &str)> = BTreeSet::new();
        let mut items: BTreeSet<&str> = BTreeSet::new();
        for event in events {
            pairs.insert((event.customer_id, event.item_id.as_str()));
            items.insert(event.item_id.as_str());
        }

        let item_ids: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        let item_index: HashMap<String, usize> = item_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let customer_ids: Vec<CustomerId> = {
            let customers: BTreeSet<CustomerId> = pairs.iter().map(|&(c, _)| c).collect();
            customers.into_iter().collect()
        };
        let customer_index: HashMap<CustomerId, usize> = customer_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut rows: Vec<Vec<u32>> = vec![Vec::new(); customer_ids.len()];
        let mut cols: Vec<Vec<u32>> = vec![Vec::new(); item_ids.len()];
        // Pairs iterate sorted by (customer, item), and item indices
        // follow item-id order, so both pushes stay sorted.
        for (customer_id, item_id) in pairs {
            let c = customer_index[&customer_id];
            let i = item_index[item_id];
            rows[c].push(i as u32);
            cols[i].push(c as u32);
        }

        debug!(
            "Built interaction matrix: {} customers x {} items, {} entries",
            customer_ids.len(),
            item_ids.len(),
            rows.iter().map(|r| r.len()).sum::<usize>()
        );

        InteractionMatrix {
            customer_ids,
            item_ids,
            customer_index,
            item_index,
            rows,
            cols,
        }
    }
}

impl InteractionMatrix {
    pub fn num_customers(&self) -> usize {
        self.customer_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    /// Number of distinct (customer, item) entries.
    pub fn num_entries(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.customer_ids.is_empty()
    }

    /// All observed item ids, ascending.
    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    /// All observed customer ids, ascending.
    pub fn customer_ids(&self) -> &[CustomerId] {
        &self.customer_ids
    }

    /// Item id for a column index.
    pub fn item_id(&self, idx: usize) -> &str {
        &self.item_ids[idx]
    }

    /// Column index for an item id, if observed.
    pub fn item_index(&self, item_id: &str) -> Option<usize> {
        self.item_index.get(item_id).copied()
    }

    /// Row index for a customer id, if observed.
    pub fn customer_index(&self, customer_id: CustomerId) -> Option<usize> {
        self.customer_index.get(&customer_id).copied()
    }

    pub fn contains_customer(&self, customer_id: CustomerId) -> bool {
        self.customer_index.contains_key(&customer_id)
    }

    /// Sorted item indices purchased by a customer row.
    pub fn items_of(&self, customer_idx: usize) -> &[u32] {
        &self.rows[customer_idx]
    }

    /// Sorted customer indices who purchased an item column.
    pub fn customers_of(&self, item_idx: usize) -> &[u32] {
        &self.cols[item_idx]
    }

    /// Item ids purchased by a customer, for presentation.
    pub fn purchased_items(&self, customer_id: CustomerId) -> Option<Vec<&str>> {
        let idx = self.customer_index(customer_id)?;
        Some(
            self.rows[idx]
                .iter()
                .map(|&i| self.item_id(i as usize))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(customer_id: CustomerId, item_id: &str) -> PurchaseEvent {
        PurchaseEvent::new(customer_id, item_id, 1)
    }

    #[test]
    fn test_empty_events_yield_empty_matrix() {
        let matrix = InteractionMatrixBuilder::build(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.num_customers(), 0);
        assert_eq!(matrix.num_items(), 0);
        assert_eq!(matrix.num_entries(), 0);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let events = vec![
            event(7, "85123A"),
            event(7, "85123A"),
            PurchaseEvent::new(7, "85123A", 24),
        ];
        let matrix = InteractionMatrixBuilder::build(&events);

        assert_eq!(matrix.num_customers(), 1);
        assert_eq!(matrix.num_items(), 1);
        assert_eq!(matrix.num_entries(), 1);
    }

    #[test]
    fn test_ascending_index_order() {
        let events = vec![
            event(20, "B"),
            event(10, "C"),
            event(10, "A"),
        ];
        let matrix = InteractionMatrixBuilder::build(&events);

        assert_eq!(matrix.customer_ids(), &[10, 20]);
        assert_eq!(matrix.item_ids(), &["A".to_string(), "B".to_string(), "C".to_string()]);
        // Customer 10 bought A (idx 0) and C (idx 2), sorted.
        assert_eq!(matrix.items_of(0), &[0, 2]);
        assert_eq!(matrix.items_of(1), &[1]);
    }

    #[test]
    fn test_row_and_column_views_agree() {
        let events = vec![
            event(1, "A"),
            event(1, "B"),
            event(2, "B"),
            event(3, "A"),
        ];
        let matrix = InteractionMatrixBuilder::build(&events);

        let a = matrix.item_index("A").unwrap();
        let b = matrix.item_index("B").unwrap();
        assert_eq!(matrix.customers_of(a), &[0, 2]); // customers 1 and 3
        assert_eq!(matrix.customers_of(b), &[0, 1]); // customers 1 and 2

        // No all-zero row or column by construction.
        for c in 0..matrix.num_customers() {
            assert!(!matrix.items_of(c).is_empty());
        }
        for i in 0..matrix.num_items() {
            assert!(!matrix.customers_of(i).is_empty());
        }
    }

    #[test]
    fn test_unknown_lookups() {
        let matrix = InteractionMatrixBuilder::build(&[event(1, "A")]);
        assert!(matrix.customer_index(999).is_none());
        assert!(matrix.item_index("ZZZ").is_none());
        assert!(!matrix.contains_customer(999));
        assert!(matrix.purchased_items(999).is_none());
    }
}
