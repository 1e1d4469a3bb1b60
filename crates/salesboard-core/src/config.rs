//! Configuration for the dashboard pipeline.
//!
//! Uses the builder pattern for ergonomic setup; every knob has the
//! default the dashboard ships with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default source file, relative to the working directory.
pub const DEFAULT_REPORT_PATH: &str = "Amazon Sale Report.csv";

/// Configuration for loading and aggregating the sale report.
///
/// # Example
///
/// ```rust,ignore
/// use salesboard_core::DashboardConfig;
///
/// let config = DashboardConfig::builder()
///     .csv_path("exports/may.csv")
///     .top_products(25)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Path to the source CSV.
    /// Default: "Amazon Sale Report.csv"
    pub csv_path: PathBuf,

    /// How many category groups the category chart keeps.
    /// Default: 12
    pub top_categories: usize,

    /// How many product groups the product chart keeps.
    /// Default: 10
    pub top_products: usize,

    /// How many city groups are kept before coordinate mapping.
    /// Default: 150
    pub top_cities: usize,

    /// Maximum rows served by the raw-data preview.
    /// Default: 1000
    pub preview_rows: usize,

    /// Rows sampled for CSV type inference.
    /// Default: 1000
    pub infer_schema_length: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_REPORT_PATH),
            top_categories: 12,
            top_products: 10,
            top_cities: 150,
            preview_rows: 1000,
            infer_schema_length: 1000,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("top_categories", self.top_categories),
            ("top_products", self.top_products),
            ("top_cities", self.top_cities),
            ("preview_rows", self.preview_rows),
            ("infer_schema_length", self.infer_schema_length),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid limit for '{field}': must be at least 1")]
    ZeroLimit { field: String },
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    csv_path: Option<PathBuf>,
    top_categories: Option<usize>,
    top_products: Option<usize>,
    top_cities: Option<usize>,
    preview_rows: Option<usize>,
    infer_schema_length: Option<usize>,
}

impl DashboardConfigBuilder {
    /// Set the source CSV path.
    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    /// Set how many category groups the category chart keeps.
    pub fn top_categories(mut self, n: usize) -> Self {
        self.top_categories = Some(n);
        self
    }

    /// Set how many product groups the product chart keeps.
    pub fn top_products(mut self, n: usize) -> Self {
        self.top_products = Some(n);
        self
    }

    /// Set how many city groups are kept before coordinate mapping.
    pub fn top_cities(mut self, n: usize) -> Self {
        self.top_cities = Some(n);
        self
    }

    /// Set the raw-data preview row cap.
    pub fn preview_rows(mut self, n: usize) -> Self {
        self.preview_rows = Some(n);
        self
    }

    /// Set the number of rows sampled for CSV type inference.
    pub fn infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            csv_path: self.csv_path.unwrap_or(defaults.csv_path),
            top_categories: self.top_categories.unwrap_or(defaults.top_categories),
            top_products: self.top_products.unwrap_or(defaults.top_products),
            top_cities: self.top_cities.unwrap_or(defaults.top_cities),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.csv_path, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(config.top_categories, 12);
        assert_eq!(config.top_products, 10);
        assert_eq!(config.top_cities, 150);
        assert_eq!(config.preview_rows, 1000);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = DashboardConfig::builder()
            .csv_path("sales.csv")
            .top_categories(5)
            .preview_rows(50)
            .build()
            .unwrap();

        assert_eq!(config.csv_path, PathBuf::from("sales.csv"));
        assert_eq!(config.top_categories, 5);
        assert_eq!(config.preview_rows, 50);
        // untouched knobs keep their defaults
        assert_eq!(config.top_products, 10);
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let result = DashboardConfig::builder().top_products(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroLimit { .. }
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = DashboardConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: DashboardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.top_cities, deserialized.top_cities);
        assert_eq!(config.csv_path, deserialized.csv_path);
    }
}
