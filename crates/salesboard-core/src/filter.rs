//! Sidebar filters over the loaded record set.
//!
//! Filters only ever remove rows. Each active dimension builds an
//! independent boolean mask; the masks AND together into a single
//! `DataFrame::filter` call, so application order cannot affect the result
//! and re-applying the same [`FilterSet`] is a no-op.

use std::collections::HashSet;

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::loader::{CANONICAL_DATE_FORMAT, LoadedReport};
use crate::schema::ColumnBindings;

/// Sentinel selection value meaning "no filtering on this dimension".
pub const SELECT_ALL: &str = "All";

/// User-selected filter values, combined with logical AND.
///
/// An empty selection list, or one containing [`SELECT_ALL`], leaves that
/// dimension unfiltered. The date range is inclusive on both ends and only
/// applies when the report resolved a date column that is not entirely null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub fulfilments: Vec<String>,
}

impl FilterSet {
    /// True when no dimension is active.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && is_select_all(&self.categories)
            && is_select_all(&self.statuses)
            && is_select_all(&self.fulfilments)
    }

    /// Filter a loaded report.
    pub fn apply(&self, report: &LoadedReport) -> Result<DataFrame> {
        self.apply_to(&report.df, &report.bindings)
    }

    /// Filter an arbitrary record set given its column bindings.
    ///
    /// Dimensions whose column did not resolve are skipped silently; the
    /// corresponding sidebar control would not have been shown.
    pub fn apply_to(&self, df: &DataFrame, bindings: &ColumnBindings) -> Result<DataFrame> {
        let mut mask: Option<BooleanChunked> = None;

        if self.start_date.is_some() || self.end_date.is_some() {
            if let Some(date_column) = &bindings.date {
                if let Some(date_mask) =
                    date_range_mask(df, date_column, self.start_date, self.end_date)?
                {
                    and_assign(&mut mask, date_mask);
                }
            }
        }

        for (selection, column) in [
            (&self.categories, &bindings.category),
            (&self.statuses, &bindings.status),
            (&self.fulfilments, &bindings.fulfilment),
        ] {
            if is_select_all(selection) {
                continue;
            }
            let Some(column) = column else { continue };
            and_assign(&mut mask, membership_mask(df, column, selection)?);
        }

        match mask {
            Some(mask) => {
                let filtered = df.filter(&mask)?;
                debug!(
                    "Filter kept {} of {} rows",
                    filtered.height(),
                    df.height()
                );
                Ok(filtered)
            }
            None => Ok(df.clone()),
        }
    }
}

/// True when a selection list applies no filtering.
pub fn is_select_all(selection: &[String]) -> bool {
    selection.is_empty() || selection.iter().any(|value| value == SELECT_ALL)
}

/// Inclusive date-range mask over the canonical ISO date column.
///
/// Returns `Ok(None)` when the column is entirely null; the sidebar would
/// not have offered a date picker in that case, so the range is ignored.
/// Rows with a null date never satisfy an active range.
fn date_range_mask(
    df: &DataFrame,
    name: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<BooleanChunked>> {
    let column = df
        .column(name)
        .map_err(|_| DashboardError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series();
    if series.null_count() == series.len() {
        return Ok(None);
    }

    let start = start.map(|d| d.format(CANONICAL_DATE_FORMAT).to_string());
    let end = end.map(|d| d.format(CANONICAL_DATE_FORMAT).to_string());

    let keep: Vec<bool> = series
        .str()?
        .into_iter()
        .map(|cell| match cell {
            Some(value) => {
                let after_start = start.as_deref().is_none_or(|s| value >= s);
                let before_end = end.as_deref().is_none_or(|e| value <= e);
                after_start && before_end
            }
            None => false,
        })
        .collect();

    Ok(Some(BooleanChunked::from_slice("date_range".into(), &keep)))
}

/// Membership mask: keep rows whose (stringified) value is in the selection.
fn membership_mask(df: &DataFrame, name: &str, selection: &[String]) -> Result<BooleanChunked> {
    let wanted: HashSet<&str> = selection.iter().map(|value| value.as_str()).collect();

    let column = df
        .column(name)
        .map_err(|_| DashboardError::ColumnNotFound(name.to_string()))?;
    let strings = column.as_materialized_series().cast(&DataType::String)?;

    let keep: Vec<bool> = strings
        .str()?
        .into_iter()
        .map(|cell| cell.is_some_and(|value| wanted.contains(value)))
        .collect();

    Ok(BooleanChunked::from_slice(name.into(), &keep))
}

fn and_assign(acc: &mut Option<BooleanChunked>, next: BooleanChunked) {
    *acc = Some(match acc.take() {
        Some(prev) => &prev & &next,
        None => next,
    });
}
