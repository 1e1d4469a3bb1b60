//! Summary metrics over the filtered record set.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::ColumnBindings;

/// The four headline metrics of the dashboard.
///
/// `avg_order_value` and `total_units` are `None` when undefined (empty
/// record set, unresolved column) and render as a placeholder rather than
/// a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
    pub total_units: Option<f64>,
}

impl SummaryMetrics {
    /// Compute the metric panel for a (typically filtered) record set.
    pub fn compute(df: &DataFrame, bindings: &ColumnBindings) -> Result<Self> {
        let total_orders = df.height();

        let (total_revenue, avg_order_value) = match &bindings.amount {
            Some(name) => {
                let amounts = df
                    .column(name)?
                    .as_materialized_series()
                    .cast(&DataType::Float64)?;
                let amounts = amounts.f64()?;
                (amounts.sum().unwrap_or(0.0), amounts.mean())
            }
            None => (0.0, None),
        };

        let total_units = match &bindings.quantity {
            Some(name) => {
                let quantities = df
                    .column(name)?
                    .as_materialized_series()
                    .cast(&DataType::Float64)?;
                Some(quantities.f64()?.sum().unwrap_or(0.0))
            }
            None => None,
        };

        Ok(Self {
            total_orders,
            total_revenue,
            avg_order_value,
            total_units,
        })
    }
}

/// Format an amount the way the metric tiles show it: rupee sign,
/// thousands separators, no decimals.
pub fn format_inr(amount: f64) -> String {
    format!("₹ {}", format_thousands(amount.round() as i64))
}

/// Format a count with thousands separators.
pub fn format_count(count: usize) -> String {
    format_thousands(count as i64)
}

fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 { format!("-{out}") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bindings() -> ColumnBindings {
        ColumnBindings {
            amount: Some("Amount".to_string()),
            quantity: Some("Qty".to_string()),
            ..ColumnBindings::default()
        }
    }

    #[test]
    fn test_three_row_scenario() {
        // Amount = [100, 200, 300], no filters: orders 3, revenue 600, avg 200
        let df = df! {
            "Amount" => &[100.0, 200.0, 300.0],
            "Qty" => &[1.0, 2.0, 1.0],
        }
        .unwrap();

        let metrics = SummaryMetrics::compute(&df, &bindings()).unwrap();
        assert_eq!(metrics.total_orders, 3);
        assert_eq!(metrics.total_revenue, 600.0);
        assert_eq!(metrics.avg_order_value, Some(200.0));
        assert_eq!(metrics.total_units, Some(4.0));
    }

    #[test]
    fn test_average_times_count_approximates_revenue() {
        let df = df! {
            "Amount" => &[149.99, 899.5, 1299.0, 756.5],
            "Qty" => &[1.0, 1.0, 2.0, 1.0],
        }
        .unwrap();

        let metrics = SummaryMetrics::compute(&df, &bindings()).unwrap();
        let reconstructed = metrics.avg_order_value.unwrap() * metrics.total_orders as f64;
        assert!((reconstructed - metrics.total_revenue).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set_has_placeholder_average() {
        let df = df! {
            "Amount" => &Vec::<f64>::new(),
            "Qty" => &Vec::<f64>::new(),
        }
        .unwrap();

        let metrics = SummaryMetrics::compute(&df, &bindings()).unwrap();
        assert_eq!(metrics.total_orders, 0);
        assert_eq!(metrics.total_revenue, 0.0);
        assert_eq!(metrics.avg_order_value, None);
    }

    #[test]
    fn test_unresolved_columns_degrade() {
        let df = df! { "Order ID" => &["a", "b"] }.unwrap();
        let metrics = SummaryMetrics::compute(&df, &ColumnBindings::default()).unwrap();
        assert_eq!(metrics.total_orders, 2);
        assert_eq!(metrics.total_revenue, 0.0);
        assert_eq!(metrics.avg_order_value, None);
        assert_eq!(metrics.total_units, None);
    }

    #[test]
    fn test_null_amounts_are_skipped() {
        let df = df! {
            "Amount" => &[Some(100.0), None, Some(300.0)],
            "Qty" => &[Some(1.0), Some(1.0), None],
        }
        .unwrap();

        let metrics = SummaryMetrics::compute(&df, &bindings()).unwrap();
        assert_eq!(metrics.total_revenue, 400.0);
        // mean over non-null values only
        assert_eq!(metrics.avg_order_value, Some(200.0));
        assert_eq!(metrics.total_units, Some(2.0));
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(1234567.4), "₹ 1,234,567");
        assert_eq!(format_inr(600.0), "₹ 600");
        assert_eq!(format_inr(0.0), "₹ 0");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(128975), "128,975");
    }
}
