//! Core domain types for the online-retail dataset.
//!
//! This module defines the data structures shared between the ETL
//! layer and the recommendation engine:
//! - Type alias for customer identifiers
//! - PurchaseEvent, the unit of input to the engine
//! - Catalog, the item-id → description lookup used for presentation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a customer (e.g. 18283 in the retail export).
pub type CustomerId = u32;

/// A single cleaned purchase observation.
///
/// One event per (invoice, stock code) line that survived cleaning.
/// The engine only cares about the (customer, item) pair; `quantity`
/// is carried through for presentation and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub customer_id: CustomerId,
    /// Stock code, e.g. "85123A". Alphanumeric, not guaranteed numeric.
    pub item_id: String,
    /// Absolute quantity from the invoice line, always >= 1 after cleaning.
    pub quantity: u32,
}

impl PurchaseEvent {
    pub fn new(customer_id: CustomerId, item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            customer_id,
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Human-readable descriptions per stock code.
///
/// Used only to render results; the scoring path never consults it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptions: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a description for an item, keeping the first non-empty
    /// one seen (the export repeats descriptions on every line and
    /// occasionally leaves them blank).
    pub fn insert(&mut self, item_id: impl Into<String>, description: impl Into<String>) {
        let description = description.into();
        if description.trim().is_empty() {
            return;
        }
        self.descriptions.entry(item_id.into()).or_insert(description);
    }

    /// Look up the description for a stock code.
    pub fn describe(&self, item_id: &str) -> Option<&str> {
        self.descriptions.get(item_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Everything the ETL produces from one CSV snapshot.
#[derive(Debug, Clone, Default)]
pub struct RetailDataset {
    pub events: Vec<PurchaseEvent>,
    pub catalog: Catalog,
}

impl RetailDataset {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
