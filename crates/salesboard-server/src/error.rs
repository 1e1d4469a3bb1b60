//! Error types for the dashboard server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use salesboard_core::DashboardError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A filter/preview query parameter failed to parse.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The listen address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Error from the dashboard pipeline.
    #[error(transparent)]
    Core(#[from] DashboardError),

    /// IO error (bind, accept).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidAddress(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(e) => match e {
                DashboardError::SourceNotFound(_) => StatusCode::NOT_FOUND,
                DashboardError::ColumnNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::Io(_) => "IO_ERROR",
            Self::Core(e) => e.error_code(),
        }
    }
}

/// Errors render as the same `{code, message}` JSON shape the core uses,
/// so the frontend has a single error contract.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = ServerError::Core(DashboardError::SourceNotFound("x".to_string()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let query = ServerError::InvalidQuery("from=yesterday".to_string());
        assert_eq!(query.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_code_passthrough() {
        let err = ServerError::Core(DashboardError::AmountColumnMissing("Amount".to_string()));
        assert_eq!(err.code(), "AMOUNT_COLUMN_MISSING");
    }
}
