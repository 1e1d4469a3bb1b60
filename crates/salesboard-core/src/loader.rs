//! Loading and cleaning of the sale report CSV.
//!
//! The loader is the only stage that touches the filesystem. It reads the
//! CSV with Polars, removes exact-duplicate rows, canonicalizes date columns
//! to ISO-8601 strings, resolves [`ColumnBindings`], and coerces the amount
//! and quantity columns to `Float64`. Cell-level problems (unparseable dates,
//! non-numeric amounts) become nulls; file-level problems and a missing
//! amount column are fatal.
//!
//! # Caching
//!
//! [`ReportCache`] memoizes the loaded report keyed by the file's
//! modification time, preserving the "load once, filter many times"
//! contract: filter interactions never re-read the file unless it changed
//! on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::schema::{self, ColumnBindings};
use crate::utils::parse_numeric_string;

/// Canonical storage format for date cells. ISO-8601 strings order
/// lexicographically the same way they order chronologically, so range
/// filters and daily grouping work on them directly.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

// Formats observed across marketplace exports; the Amazon month-first
// short-year form comes first because it is the common case.
const DATE_FORMATS: &[&str] = &[
    "%m-%d-%y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%m/%d/%y",
];

/// Metadata about the loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInfo {
    pub path: String,
    pub name: String,
    pub size_bytes: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub duplicates_removed: usize,
}

/// The cleaned record set plus its resolved column bindings.
pub struct LoadedReport {
    /// All order rows after deduplication and type coercion.
    pub df: DataFrame,
    /// Column names resolved per role, computed once per load.
    pub bindings: ColumnBindings,
    /// Cached file metadata, computed once when loading.
    pub info: ReportInfo,
}

/// Load and clean the sale report with default inference settings.
pub fn load_report(path: impl AsRef<Path>) -> Result<LoadedReport> {
    load_report_with(path, DashboardConfig::default().infer_schema_length)
}

/// Load and clean the sale report.
///
/// Fatal failures: missing/unreadable file, unparseable CSV, and a header
/// without any accepted amount column name. Everything else degrades to
/// nulls or absent bindings.
pub fn load_report_with(path: impl AsRef<Path>, infer_schema_length: usize) -> Result<LoadedReport> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DashboardError::SourceNotFound(path.display().to_string()));
    }
    let metadata = fs::metadata(path)?;

    info!("Loading sale report from: {}", path.display());
    let mut df = read_csv(path, infer_schema_length)?;
    debug!("Parsed CSV: {} rows x {} columns", df.height(), df.width());

    // Exact-duplicate rows carry no information; drop them before anything
    // else so metrics and groups count each order once.
    let before_dedup = df.height();
    df = df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?;
    let duplicates_removed = before_dedup - df.height();
    if duplicates_removed > 0 {
        debug!("Removed {} duplicate rows", duplicates_removed);
    }

    // Canonicalize every date-named column present, not just the resolved
    // one; downstream stages may inspect any of them.
    for candidate in schema::DATE_CANDIDATES {
        if df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == *candidate)
        {
            canonicalize_date_column(&mut df, candidate)?;
        }
    }

    if df.height() == 0 {
        return Err(DashboardError::EmptyReport);
    }

    let bindings = ColumnBindings::resolve(&df);
    debug!("Resolved column bindings: {:?}", bindings);

    let Some(amount) = bindings.amount.clone() else {
        return Err(DashboardError::AmountColumnMissing(
            schema::AMOUNT_CANDIDATES.join(", "),
        ));
    };
    coerce_numeric(&mut df, &amount)?;
    if let Some(quantity) = bindings.quantity.clone() {
        coerce_numeric(&mut df, &quantity)?;
    }

    let info = ReportInfo {
        path: path.display().to_string(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        size_bytes: metadata.len(),
        row_count: df.height(),
        column_count: df.width(),
        duplicates_removed,
    };
    info!(
        "Sale report loaded: {} rows x {} columns",
        info.row_count, info.column_count
    );

    Ok(LoadedReport { df, bindings, info })
}

/// Read the CSV, retrying without quote handling when the first attempt
/// fails on malformed quoting.
fn read_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(infer_schema_length))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| DashboardError::ReadFailed(e.to_string()))?;

    match reader.finish() {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Quoted CSV parse failed, retrying without quotes: {}", e),
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(infer_schema_length))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| DashboardError::ReadFailed(e.to_string()))?
        .finish()
        .map_err(|e| DashboardError::ParseFailed(e.to_string()))
}

/// Parse one raw date cell against the accepted formats.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    // Datetime cells (e.g. from a Datetime column cast to String)
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Rewrite a date column to canonical ISO strings; unparseable cells
/// become null rather than aborting the load.
fn canonicalize_date_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let canonical = {
        let series = df.column(name)?.as_materialized_series();
        let source = match series.dtype() {
            DataType::String => series.clone(),
            // Polars may have inferred a temporal dtype already; its string
            // form is ISO, which parse_report_date accepts.
            DataType::Date | DataType::Datetime(_, _) => series.cast(&DataType::String)?,
            _ => return Ok(()),
        };
        let values: Vec<Option<String>> = source
            .str()?
            .into_iter()
            .map(|cell| {
                cell.and_then(parse_report_date)
                    .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
            })
            .collect();
        Series::new(name.into(), values)
    };
    df.replace(name, canonical)?;
    Ok(())
}

/// Coerce a column to `Float64`. String cells go through formatting-aware
/// parsing; anything unparseable becomes null.
fn coerce_numeric(df: &mut DataFrame, name: &str) -> Result<()> {
    let coerced = {
        let series = df.column(name)?.as_materialized_series();
        match series.dtype() {
            DataType::String => {
                let values: Vec<Option<f64>> = series
                    .str()?
                    .into_iter()
                    .map(|cell| cell.and_then(parse_numeric_string))
                    .collect();
                Series::new(name.into(), values)
            }
            DataType::Float64 => return Ok(()),
            _ => series.cast(&DataType::Float64)?,
        }
    };
    df.replace(name, coerced)?;
    Ok(())
}

// ============================================================================
// Report cache
// ============================================================================

struct CacheEntry {
    modified: SystemTime,
    report: Arc<LoadedReport>,
}

/// Explicit memoization of the loaded report, keyed by the source file's
/// modification time.
///
/// Unlike ambient per-process caching, the cache is a value injected into
/// whatever owns the pipeline (CLI, HTTP state, tests), and it re-reads the
/// file only when the mtime moves.
pub struct ReportCache {
    path: PathBuf,
    infer_schema_length: usize,
    slot: RwLock<Option<CacheEntry>>,
}

impl ReportCache {
    /// Create a cache for the given source file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_infer_schema_length(path, DashboardConfig::default().infer_schema_length)
    }

    /// Create a cache with an explicit schema-inference sample size.
    pub fn with_infer_schema_length(path: impl Into<PathBuf>, infer_schema_length: usize) -> Self {
        Self {
            path: path.into(),
            infer_schema_length,
            slot: RwLock::new(None),
        }
    }

    /// Path of the source file this cache watches.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached report, reloading if the file changed on disk.
    pub fn get(&self) -> Result<Arc<LoadedReport>> {
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|_| DashboardError::SourceNotFound(self.path.display().to_string()))?;

        if let Some(entry) = self.slot.read().as_ref() {
            if entry.modified == modified {
                return Ok(entry.report.clone());
            }
        }

        info!("Sale report changed on disk, reloading");
        let report = Arc::new(load_report_with(&self.path, self.infer_schema_length)?);
        *self.slot.write() = Some(CacheEntry {
            modified,
            report: report.clone(),
        });
        Ok(report)
    }

    /// Drop the cached report; the next `get` re-reads the file.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_report_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 4, 30).unwrap();
        assert_eq!(parse_report_date("04-30-22"), Some(expected));
        assert_eq!(parse_report_date("04-30-2022"), Some(expected));
        assert_eq!(parse_report_date("2022-04-30"), Some(expected));
        assert_eq!(parse_report_date("30-04-2022"), Some(expected));
        assert_eq!(parse_report_date("2022-04-30 18:05:00"), Some(expected));
    }

    #[test]
    fn test_parse_report_date_rejects_garbage() {
        assert_eq!(parse_report_date(""), None);
        assert_eq!(parse_report_date("   "), None);
        assert_eq!(parse_report_date("not-a-date"), None);
        assert_eq!(parse_report_date("13-45-22"), None);
    }

    #[test]
    fn test_canonicalize_date_column_mixed_cells() {
        let mut df = df! {
            "Date" => &[Some("04-30-22"), Some("garbage"), None, Some("2022-05-02")],
        }
        .unwrap();

        canonicalize_date_column(&mut df, "Date").unwrap();

        let dates = df.column("Date").unwrap().as_materialized_series().clone();
        let values: Vec<Option<String>> = dates
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        assert_eq!(
            values,
            vec![
                Some("2022-04-30".to_string()),
                None,
                None,
                Some("2022-05-02".to_string()),
            ]
        );
    }

    #[test]
    fn test_coerce_numeric_string_column() {
        let mut df = df! {
            "Amount" => &[Some("499"), Some("₹ 1,299.00"), Some("free"), None],
        }
        .unwrap();

        coerce_numeric(&mut df, "Amount").unwrap();

        let amounts = df.column("Amount").unwrap().as_materialized_series().clone();
        assert_eq!(amounts.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = amounts.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(499.0), Some(1299.0), None, None]);
    }

    #[test]
    fn test_coerce_numeric_integer_column() {
        let mut df = df! { "Qty" => &[1i64, 2, 3] }.unwrap();
        coerce_numeric(&mut df, "Qty").unwrap();
        assert_eq!(
            df.column("Qty").unwrap().dtype(),
            &DataType::Float64
        );
    }
}
