//! Column-role resolution for the open report schema.
//!
//! Marketplace exports vary in how they name the interesting columns
//! ("Amount" vs "Sale Amount", "Qty" vs "Quantity", "ship-city" vs "City").
//! Instead of guessing inline at each use site, the header is probed once
//! per load and the outcome is captured in [`ColumnBindings`]: one resolved
//! column name per role, or `None` when no candidate matched.
//!
//! Candidate lists are ordered; the first header match wins.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Accepted names for the order-date column.
pub const DATE_CANDIDATES: &[&str] = &["Date", "date"];

/// Accepted names for the order-amount column.
pub const AMOUNT_CANDIDATES: &[&str] = &["Amount", "amount", "Sale Amount", "Order Value"];

/// Accepted names for the unit-quantity column.
pub const QUANTITY_CANDIDATES: &[&str] = &["Qty", "Quantity", "qty"];

/// Accepted names for the product-category column.
pub const CATEGORY_CANDIDATES: &[&str] = &["Category", "category"];

/// Accepted names for the order-status column.
pub const STATUS_CANDIDATES: &[&str] = &["Status", "status"];

/// Accepted names for the fulfilment-channel column.
pub const FULFILMENT_CANDIDATES: &[&str] = &["Fulfilment", "fulfilment", "Fulfillment"];

/// Accepted names for the product-identifier column. SKU wins over Style.
pub const PRODUCT_CANDIDATES: &[&str] = &["SKU", "Style"];

/// Accepted names for the shipping-city column.
pub const CITY_CANDIDATES: &[&str] = &["ship-city", "Ship City", "ship_city", "City", "city"];

/// Resolved column names for each role the dashboard cares about.
///
/// Every field is optional: the loader decides which absences are fatal
/// (amount) and which merely degrade one chart or filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBindings {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub fulfilment: Option<String>,
    pub product: Option<String>,
    pub city: Option<String>,
}

impl ColumnBindings {
    /// Probe the DataFrame header and resolve every role at once.
    pub fn resolve(df: &DataFrame) -> Self {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        Self {
            date: resolve_column(&headers, DATE_CANDIDATES),
            amount: resolve_column(&headers, AMOUNT_CANDIDATES),
            quantity: resolve_column(&headers, QUANTITY_CANDIDATES),
            category: resolve_column(&headers, CATEGORY_CANDIDATES),
            status: resolve_column(&headers, STATUS_CANDIDATES),
            fulfilment: resolve_column(&headers, FULFILMENT_CANDIDATES),
            product: resolve_column(&headers, PRODUCT_CANDIDATES),
            city: resolve_column(&headers, CITY_CANDIDATES),
        }
    }
}

/// Resolve a single role: the first candidate that appears in the header,
/// compared exactly (no trimming, no case folding; exports are consistent
/// within one file even when they differ between files).
pub fn resolve_column(headers: &[String], candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| headers.iter().any(|header| header == *candidate))
        .map(|candidate| candidate.to_string())
}
