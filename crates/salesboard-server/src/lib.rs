//! HTTP dashboard server for the marketplace sale report.
//!
//! # Architecture
//!
//! - **State**: the cached report snapshot plus dashboard configuration
//! - **Routes**: JSON endpoints for metrics, facets, charts, and the raw
//!   preview, plus the embedded single-page UI
//! - **Preview**: bounded row windows serialized as JSON cells
//!
//! The server is read-only against the source file: interactions re-run
//! filter → metrics → charts on the in-memory record set; the CSV is only
//! re-read when its mtime changes.

pub mod error;
pub mod preview;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use salesboard_core::DashboardConfig;

pub use error::{ServerError, ServerResult};
pub use routes::create_router;
pub use state::AppState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Start the dashboard server.
///
/// The report is loaded once up front so fatal conditions (missing file,
/// missing amount column) abort before the socket binds, matching the
/// "halt with message, no partial rendering" contract.
pub async fn serve(config: ServerConfig, dashboard: DashboardConfig) -> ServerResult<()> {
    let state = Arc::new(AppState::new(dashboard));

    let report = state.report()?;
    tracing::info!(
        "Serving {} ({} rows x {} columns)",
        report.info.name,
        report.info.row_count,
        report.info.column_count
    );
    drop(report);

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;

    tracing::info!("Starting salesboard server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received shutdown signal");
    }
}
