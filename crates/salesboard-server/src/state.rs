//! Shared application state.
//!
//! All state lives in Rust; the HTML page is purely a renderer. The loaded
//! report sits behind a [`ReportCache`], so every handler sees the same
//! snapshot until the source file changes on disk; handlers re-run only
//! the filter → metrics → charts pipeline, never the load stage.

use std::sync::Arc;

use salesboard_core::{DashboardConfig, LoadedReport, ReportCache};

use crate::error::ServerResult;

/// Application state shared across handlers.
pub struct AppState {
    cache: ReportCache,
    config: DashboardConfig,
}

impl AppState {
    /// Create state for the given dashboard configuration.
    pub fn new(config: DashboardConfig) -> Self {
        let cache = ReportCache::with_infer_schema_length(
            config.csv_path.clone(),
            config.infer_schema_length,
        );
        Self { cache, config }
    }

    /// The dashboard configuration (top-N limits, preview cap).
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Current report snapshot, reloading if the file changed on disk.
    pub fn report(&self) -> ServerResult<Arc<LoadedReport>> {
        Ok(self.cache.get()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_report(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("report.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Date,Category,Amount").unwrap();
        writeln!(file, "04-30-22,Kurta,100").unwrap();
        writeln!(file, "05-01-22,Set,200").unwrap();
        path
    }

    #[test]
    fn test_state_serves_cached_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir);
        let config = DashboardConfig::builder().csv_path(path).build().unwrap();

        let state = AppState::new(config);
        let first = state.report().unwrap();
        let second = state.report().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.df.height(), 2);
    }
}
