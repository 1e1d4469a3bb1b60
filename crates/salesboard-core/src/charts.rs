//! Grouped chart series over the filtered record set.
//!
//! Every chart follows the same shape: group rows by a key column, sum the
//! amount per group, sort, truncate to the chart's top-N. Rows with a null
//! key are excluded from grouping (they still count toward the metric
//! panel); null amounts contribute zero. A chart whose key or amount column
//! did not resolve yields `None` and the UI shows an informational
//! placeholder for that tab.

use std::cmp::Ordering;
use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::ColumnBindings;

/// One group in a revenue bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSlice {
    pub label: String,
    pub revenue: f64,
}

/// One point on the daily revenue trend line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenuePoint {
    /// Canonical ISO date.
    pub date: String,
    pub revenue: f64,
}

/// Top-products chart payload; `column` names which identifier was used
/// (SKU when present, Style otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductChart {
    pub column: String,
    pub slices: Vec<RevenueSlice>,
}

/// Sum the amount column per distinct key, descending by revenue.
///
/// Ties break on the label so the ordering is deterministic. The returned
/// vector is complete (no truncation); callers truncate to their top-N.
pub fn revenue_by_group(
    df: &DataFrame,
    key_column: &str,
    amount_column: &str,
) -> Result<Vec<RevenueSlice>> {
    let keys = df
        .column(key_column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let amounts = df
        .column(amount_column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let mut totals: HashMap<String, f64> = HashMap::new();
    for (key, amount) in keys.str()?.into_iter().zip(amounts.f64()?.into_iter()) {
        let Some(key) = key else { continue };
        *totals.entry(key.to_string()).or_insert(0.0) += amount.unwrap_or(0.0);
    }

    let mut slices: Vec<RevenueSlice> = totals
        .into_iter()
        .map(|(label, revenue)| RevenueSlice { label, revenue })
        .collect();
    slices.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(slices)
}

/// Revenue by category, truncated to the configured top-N (12 by default).
pub fn revenue_by_category(
    df: &DataFrame,
    bindings: &ColumnBindings,
    limit: usize,
) -> Result<Option<Vec<RevenueSlice>>> {
    let (Some(category), Some(amount)) = (&bindings.category, &bindings.amount) else {
        return Ok(None);
    };
    let mut slices = revenue_by_group(df, category, amount)?;
    slices.truncate(limit);
    Ok(Some(slices))
}

/// Daily revenue trend over the canonical date column, chronological order.
pub fn daily_revenue(df: &DataFrame, bindings: &ColumnBindings) -> Result<Option<Vec<DailyRevenuePoint>>> {
    let (Some(date), Some(amount)) = (&bindings.date, &bindings.amount) else {
        return Ok(None);
    };
    let mut points: Vec<DailyRevenuePoint> = revenue_by_group(df, date, amount)?
        .into_iter()
        .map(|slice| DailyRevenuePoint {
            date: slice.label,
            revenue: slice.revenue,
        })
        .collect();
    // ISO strings sort chronologically
    points.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(Some(points))
}

/// Top products by revenue, truncated to the configured top-N (10 by default).
pub fn top_products(
    df: &DataFrame,
    bindings: &ColumnBindings,
    limit: usize,
) -> Result<Option<ProductChart>> {
    let (Some(product), Some(amount)) = (&bindings.product, &bindings.amount) else {
        return Ok(None);
    };
    let mut slices = revenue_by_group(df, product, amount)?;
    slices.truncate(limit);
    Ok(Some(ProductChart {
        column: product.clone(),
        slices,
    }))
}

/// Revenue per shipping city, truncated before coordinate mapping
/// (150 by default). Coordinate resolution happens in [`crate::geo`].
pub fn city_revenue(
    df: &DataFrame,
    bindings: &ColumnBindings,
    limit: usize,
) -> Result<Option<Vec<RevenueSlice>>> {
    let (Some(city), Some(amount)) = (&bindings.city, &bindings.amount) else {
        return Ok(None);
    };
    let mut slices = revenue_by_group(df, city, amount)?;
    slices.truncate(limit);
    Ok(Some(slices))
}
