//! Shared helpers for cell-level coercion.
//!
//! Marketplace exports format money as display strings ("₹ 1,299.00"), so
//! numeric coercion strips formatting characters before parsing. Values that
//! still fail to parse become missing, never errors.

use polars::prelude::*;

/// Characters commonly used in amount formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 5] = [',', '₹', '$', '%', ' '];

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles currency symbols and thousands separators; empty and
/// non-numeric strings yield `None`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("₹ 1,299.00"), "1299.00");
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42  "), "42");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("499"), Some(499.0));
        assert_eq!(parse_numeric_string("₹ 1,299.00"), Some(1299.0));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("free"), None);
    }
}
