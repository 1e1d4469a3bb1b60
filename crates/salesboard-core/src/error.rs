//! Error types for the dashboard pipeline.
//!
//! The hierarchy distinguishes fatal conditions (missing source file,
//! unresolvable amount column) from conditions that degrade a single UI
//! section. Errors serialize as `{code, message}` objects so the HTTP layer
//! can forward them to the frontend unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for loading and aggregating the sale report.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Source CSV does not exist at the configured path.
    #[error("Sale report not found: {0}")]
    SourceNotFound(String),

    /// Source CSV exists but could not be opened or read.
    #[error("Failed to read sale report: {0}")]
    ReadFailed(String),

    /// CSV parsing failed after all fallback strategies.
    #[error("Failed to parse sale report: {0}")]
    ParseFailed(String),

    /// None of the accepted amount column names appear in the header.
    #[error("No amount column found in report header (accepted names: {0})")]
    AmountColumnMissing(String),

    /// A column expected by a stage was not found in the record set.
    #[error("Column '{0}' not found in report")]
    ColumnNotFound(String),

    /// The record set contains no rows after cleaning.
    #[error("Sale report is empty after cleaning")]
    EmptyReport,

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::ReadFailed(_) => "READ_FAILED",
            Self::ParseFailed(_) => "PARSE_FAILED",
            Self::AmountColumnMissing(_) => "AMOUNT_COLUMN_MISSING",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::EmptyReport => "EMPTY_REPORT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether this error halts the whole dashboard rather than degrading
    /// a single section.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_)
                | Self::ReadFailed(_)
                | Self::ParseFailed(_)
                | Self::AmountColumnMissing(_)
                | Self::EmptyReport
                | Self::InvalidConfig(_)
        )
    }
}

/// Serialize as a `{code, message}` struct for the frontend.
impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            DashboardError::SourceNotFound("x.csv".to_string()).error_code(),
            "SOURCE_NOT_FOUND"
        );
        assert_eq!(
            DashboardError::ColumnNotFound("Amount".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(DashboardError::AmountColumnMissing("Amount".to_string()).is_fatal());
        assert!(DashboardError::SourceNotFound("x.csv".to_string()).is_fatal());
        assert!(DashboardError::EmptyReport.is_fatal());
        assert!(!DashboardError::ColumnNotFound("City".to_string()).is_fatal());
    }

    #[test]
    fn test_error_serialization() {
        let error = DashboardError::ColumnNotFound("ship-city".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("ship-city"));
    }
}
