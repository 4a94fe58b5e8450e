//! Parser and cleaning rules for the online-retail CSV export.
//!
//! Expected header:
//! `InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country`
//!
//! Cleaning applied before any row becomes a [`PurchaseEvent`]:
//! - rows with a missing Description AND a 0.0 UnitPrice are corrupted
//!   export artifacts and are dropped
//! - exact duplicate rows are dropped
//! - Quantity is taken as an absolute value (returns show up negative)
//!   and zero-quantity rows are dropped
//! - rows without a CustomerID cannot be attributed and are dropped
//!
//! Every dropped class is counted and logged, mirroring the audit trail
//! the retail ETL keeps.

use crate::error::{DataLoadError, Result};
use crate::types::{Catalog, CustomerId, PurchaseEvent, RetailDataset};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One raw line of the export, as serde sees it.
#[derive(Debug, Clone, Deserialize)]
struct RetailRecord {
    #[serde(rename = "InvoiceNo")]
    invoice_no: String,
    #[serde(rename = "StockCode")]
    stock_code: String,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "InvoiceDate")]
    invoice_date: String,
    #[serde(rename = "UnitPrice")]
    unit_price: f64,
    #[serde(rename = "CustomerID")]
    customer_id: Option<String>,
    #[serde(rename = "Country")]
    #[allow(dead_code)]
    country: Option<String>,
}

impl RetailRecord {
    fn description_missing(&self) -> bool {
        self.description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    }

    /// The export writes customer ids either as plain integers or with
    /// a spurious ".0" suffix once spreadsheets have touched the file.
    fn parse_customer_id(&self) -> Option<CustomerId> {
        let raw = self.customer_id.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let raw = raw.strip_suffix(".0").unwrap_or(raw);
        raw.parse::<CustomerId>().ok()
    }

    /// Key for exact-duplicate detection over the fields that matter.
    fn dedup_key(&self) -> (String, String, i64, String, u64, Option<String>) {
        (
            self.invoice_no.clone(),
            self.stock_code.clone(),
            self.quantity,
            self.invoice_date.clone(),
            self.unit_price.to_bits(),
            self.customer_id.clone(),
        )
    }
}

/// Load and clean a retail CSV export from disk.
pub fn load_retail_csv(path: &Path) -> Result<RetailDataset> {
    let file = File::open(path).map_err(|_| DataLoadError::FileNotFound {
        path: path.display().to_string(),
    })?;
    info!("Reading retail export from {}", path.display());
    read_retail_csv(file)
}

/// Load and clean a retail CSV export from any reader.
///
/// Separated from [`load_retail_csv`] so tests can feed in-memory data.
pub fn read_retail_csv<R: Read>(reader: R) -> Result<RetailDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut catalog = Catalog::new();
    let mut seen: HashSet<_> = HashSet::new();

    let mut total_rows = 0usize;
    let mut corrupted = 0usize;
    let mut duplicates = 0usize;
    let mut missing_customer = 0usize;
    let mut zero_quantity = 0usize;

    for record in csv_reader.deserialize::<RetailRecord>() {
        let record = record?;
        total_rows += 1;

        // Corrupted export artifact: no description and a zero price.
        if record.description_missing() && record.unit_price == 0.0 {
            corrupted += 1;
            continue;
        }

        if !seen.insert(record.dedup_key()) {
            duplicates += 1;
            continue;
        }

        if let Some(description) = record.description.as_deref() {
            catalog.insert(record.stock_code.clone(), description);
        }

        let Some(customer_id) = record.parse_customer_id() else {
            missing_customer += 1;
            continue;
        };

        let quantity = record.quantity.unsigned_abs();
        if quantity == 0 {
            zero_quantity += 1;
            continue;
        }
        let quantity = u32::try_from(quantity).map_err(|_| DataLoadError::InvalidValue {
            field: "Quantity".to_string(),
            value: record.quantity.to_string(),
        })?;

        events.push(PurchaseEvent {
            customer_id,
            item_id: record.stock_code,
            quantity,
        });
    }

    info!(
        "Read {} rows: dropped {} corrupted, {} duplicates, {} without customer, {} zero-quantity",
        total_rows, corrupted, duplicates, missing_customer, zero_quantity
    );
    debug!(
        "Kept {} purchase events across {} catalogued items",
        events.len(),
        catalog.len()
    );

    Ok(RetailDataset { events, catalog })
}
