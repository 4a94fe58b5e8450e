//! # Data Loader Crate
//!
//! This crate handles loading and cleaning the online-retail CSV
//! export that feeds the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (PurchaseEvent, Catalog, RetailDataset)
//! - **parser**: Parse and clean the CSV export into purchase events
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::load_retail_csv;
//! use std::path::Path;
//!
//! let dataset = load_retail_csv(Path::new("data/online_retail.csv"))?;
//!
//! println!(
//!     "{} purchase events, {} catalogued items",
//!     dataset.events.len(),
//!     dataset.catalog.len()
//! );
//! ```
//!
//! The engine treats this crate as its upstream collaborator: malformed
//! rows are rejected here, so every event handed over carries a valid
//! customer id, a non-empty stock code, and a positive quantity.

// Public modules
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::{load_retail_csv, read_retail_csv};
pub use types::{Catalog, CustomerId, PurchaseEvent, RetailDataset};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_missing_file_is_reported() {
        let result = load_retail_csv(Path::new("data/does_not_exist.csv"));
        assert!(matches!(
            result,
            Err(DataLoadError::FileNotFound { .. })
        ));
    }
}
