//! Marketplace Sales Dashboard Engine
//!
//! Filtering and aggregation over a single marketplace order-export CSV,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline is deliberately linear:
//!
//! - **Loader**: reads the CSV once, deduplicates rows, canonicalizes date
//!   columns, resolves which header names carry the amount/quantity/city
//!   roles, and coerces amounts to numeric. Cached per file mtime.
//! - **Filter**: narrows the record set by date range, category, order
//!   status, and fulfilment channel, combined with logical AND.
//! - **Metrics**: order count, total revenue, average order value, units.
//! - **Charts**: group-by-and-sum series (category, day, product, city)
//!   with top-N truncation, plus static city-coordinate mapping.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use salesboard_core::{FilterSet, SummaryMetrics, charts, loader};
//!
//! let report = loader::load_report("Amazon Sale Report.csv")?;
//!
//! let filter = FilterSet {
//!     categories: vec!["Kurta".to_string()],
//!     ..FilterSet::default()
//! };
//! let filtered = filter.apply(&report)?;
//!
//! let metrics = SummaryMetrics::compute(&filtered, &report.bindings)?;
//! println!("{} orders, revenue {}", metrics.total_orders, metrics.total_revenue);
//!
//! let categories = charts::revenue_by_category(&filtered, &report.bindings, 12)?;
//! ```
//!
//! # Load once, filter many times
//!
//! [`loader::ReportCache`] memoizes the loaded report keyed by the file's
//! modification time. UI interactions re-run only filter → metrics → charts;
//! the file is re-read only when it changes on disk.

pub mod charts;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod metrics;
pub mod schema;
pub mod utils;

// Re-exports for convenient access
pub use charts::{DailyRevenuePoint, ProductChart, RevenueSlice};
pub use config::{ConfigValidationError, DashboardConfig, DashboardConfigBuilder};
pub use error::{DashboardError, Result as DashboardResult};
pub use filter::{FilterSet, SELECT_ALL};
pub use geo::{CityPoint, CityRevenueMap, city_coordinates, map_city_revenue};
pub use loader::{LoadedReport, ReportCache, ReportInfo, load_report, load_report_with};
pub use metrics::{SummaryMetrics, format_count, format_inr};
pub use schema::ColumnBindings;
