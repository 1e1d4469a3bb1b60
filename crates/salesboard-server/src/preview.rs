//! Raw-data preview: filtered rows as JSON cells.
//!
//! The grid only ever shows a window of the filtered set, capped at the
//! configured preview size, so the payload stays bounded no matter how
//! large the report is.

use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;
use serde_json::{Number, Value};

/// A single row of cell values, one JSON value per column.
pub type Row = Vec<Value>;

/// Response for the preview grid.
///
/// `total_rows` is the preview-capped size of the filtered set, for
/// scrollbar/pagination math on the frontend.
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub start: usize,
    pub total_rows: usize,
}

/// Convert a Polars cell to a JSON value.
///
/// NaN and infinite floats become `null` (JSON cannot carry them); any
/// type without a native JSON shape is stringified via `Display`.
fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::Number(v.into()),
        AnyValue::Int16(v) => Value::Number(v.into()),
        AnyValue::Int32(v) => Value::Number(v.into()),
        AnyValue::Int64(v) => Value::Number(v.into()),
        AnyValue::UInt8(v) => Value::Number(v.into()),
        AnyValue::UInt16(v) => Value::Number(v.into()),
        AnyValue::UInt32(v) => Value::Number(v.into()),
        AnyValue::UInt64(v) => Value::Number(v.into()),
        AnyValue::Float32(v) => Number::from_f64(v as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(format!("{}", other)),
    }
}

/// Collect a clamped window of rows for the preview grid.
///
/// `start` beyond the capped set clamps to the last valid row; `count`
/// never reads past `cap`. An empty filtered set yields an empty window.
pub fn collect_rows(df: &DataFrame, start: usize, count: usize, cap: usize) -> RowsResponse {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let total_rows = df.height().min(cap);
    let start = start.min(total_rows.saturating_sub(1));
    let available = total_rows.saturating_sub(start);
    let actual_count = count.min(available);

    if actual_count == 0 {
        return RowsResponse {
            columns,
            rows: vec![],
            start,
            total_rows,
        };
    }

    // Polars slice is O(1); only the requested window is converted to JSON.
    let sliced = df.slice(start as i64, actual_count);
    let mut rows = Vec::with_capacity(actual_count);
    for row_idx in 0..sliced.height() {
        let mut row = Vec::with_capacity(sliced.width());
        for col in sliced.get_columns() {
            let value = col
                .get(row_idx)
                .ok()
                .map_or(Value::Null, any_value_to_json);
            row.push(value);
        }
        rows.push(row);
    }

    RowsResponse {
        columns,
        rows,
        start,
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn sample_df() -> DataFrame {
        df! {
            "Category" => &["Kurta", "Set", "Top", "Saree"],
            "Amount" => &[Some(100.0), None, Some(f64::NAN), Some(300.0)],
            "Qty" => &[1i64, 2, 3, 4],
        }
        .unwrap()
    }

    #[test]
    fn test_collect_rows_basic() {
        let df = sample_df();
        let response = collect_rows(&df, 0, 2, 1000);
        assert_eq!(response.columns, vec!["Category", "Amount", "Qty"]);
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.start, 0);
        assert_eq!(response.total_rows, 4);
        assert_eq!(response.rows[0][0], Value::String("Kurta".to_string()));
        assert_eq!(response.rows[1][1], Value::Null);
    }

    #[test]
    fn test_nan_becomes_null() {
        let df = sample_df();
        let response = collect_rows(&df, 2, 1, 1000);
        assert_eq!(response.rows[0][1], Value::Null);
    }

    #[test]
    fn test_preview_cap_bounds_total() {
        let df = sample_df();
        let response = collect_rows(&df, 0, 100, 3);
        assert_eq!(response.total_rows, 3);
        assert_eq!(response.rows.len(), 3);
    }

    #[test]
    fn test_start_beyond_end_clamps() {
        let df = sample_df();
        let response = collect_rows(&df, 50, 10, 1000);
        assert_eq!(response.start, 3);
        assert_eq!(response.rows.len(), 1);
    }

    #[test]
    fn test_empty_frame() {
        let df = sample_df().head(Some(0));
        let response = collect_rows(&df, 0, 10, 1000);
        assert!(response.rows.is_empty());
        assert_eq!(response.total_rows, 0);
    }
}
