//! HTTP routes for the dashboard server.
//!
//! Every `/api` handler runs the same short pipeline: take the cached
//! report snapshot, apply the filters from the query string, aggregate,
//! serialize. The load stage never runs here unless the source file
//! changed on disk.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use salesboard_core::{
    DashboardError, FilterSet, SELECT_ALL, SummaryMetrics, charts, geo,
};

use crate::error::{ServerError, ServerResult};
use crate::preview::{self, RowsResponse};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/report", get(report_handler))
        .route("/api/facets", get(facets_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/charts/categories", get(categories_handler))
        .route("/api/charts/daily", get(daily_handler))
        .route("/api/charts/products", get(products_handler))
        .route("/api/charts/cities", get(cities_handler))
        .route("/api/rows", get(rows_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Query parameters
// ============================================================================

/// Filter and preview parameters, shared by every `/api` endpoint.
///
/// List parameters are comma-separated; an absent list or one containing
/// the `All` sentinel leaves that dimension unfiltered.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub categories: Option<String>,
    pub statuses: Option<String>,
    pub fulfilments: Option<String>,
    // preview window, /api/rows only
    pub start: Option<usize>,
    pub count: Option<usize>,
}

impl DashboardQuery {
    fn filter_set(&self) -> ServerResult<FilterSet> {
        Ok(FilterSet {
            start_date: parse_query_date(self.from.as_deref())?,
            end_date: parse_query_date(self.to.as_deref())?,
            categories: split_list(self.categories.as_deref()),
            statuses: split_list(self.statuses.as_deref()),
            fulfilments: split_list(self.fulfilments.as_deref()),
        })
    }
}

fn parse_query_date(raw: Option<&str>) -> ServerResult<Option<chrono::NaiveDate>> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ServerError::InvalidQuery(format!("not an ISO date: {value:?}"))),
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Metadata about the loaded report: file info plus resolved bindings.
async fn report_handler(
    State(state): State<Arc<AppState>>,
) -> ServerResult<Json<serde_json::Value>> {
    let report = state.report()?;
    Ok(Json(serde_json::json!({
        "info": report.info,
        "bindings": report.bindings,
    })))
}

/// Sidebar building blocks: distinct values per dimension and the
/// observed date span. Dimensions without a resolved column come back
/// empty and the UI hides their control.
#[derive(Debug, Serialize)]
pub struct FacetsResponse {
    pub select_all: &'static str,
    pub categories: Vec<String>,
    pub statuses: Vec<String>,
    pub fulfilments: Vec<String>,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
}

async fn facets_handler(State(state): State<Arc<AppState>>) -> ServerResult<Json<FacetsResponse>> {
    let report = state.report()?;
    let df = &report.df;
    let bindings = &report.bindings;

    let (date_min, date_max) = match &bindings.date {
        Some(name) => date_span(df, name)?,
        None => (None, None),
    };

    Ok(Json(FacetsResponse {
        select_all: SELECT_ALL,
        categories: facet_values(df, bindings.category.as_deref())?,
        statuses: facet_values(df, bindings.status.as_deref())?,
        fulfilments: facet_values(df, bindings.fulfilment.as_deref())?,
        date_min,
        date_max,
    }))
}

async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<SummaryMetrics>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    Ok(Json(SummaryMetrics::compute(&filtered, &report.bindings)?))
}

/// Chart payloads are `null` when the backing column did not resolve
/// (the tab shows an informational placeholder) and an empty series when
/// the filters matched nothing (the tab shows "no data").
async fn categories_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<Option<Vec<charts::RevenueSlice>>>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    Ok(Json(charts::revenue_by_category(
        &filtered,
        &report.bindings,
        state.config().top_categories,
    )?))
}

async fn daily_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<Option<Vec<charts::DailyRevenuePoint>>>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    Ok(Json(charts::daily_revenue(&filtered, &report.bindings)?))
}

async fn products_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<Option<charts::ProductChart>>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    Ok(Json(charts::top_products(
        &filtered,
        &report.bindings,
        state.config().top_products,
    )?))
}

async fn cities_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<Option<geo::CityRevenueMap>>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    let slices = charts::city_revenue(&filtered, &report.bindings, state.config().top_cities)?;
    Ok(Json(slices.map(geo::map_city_revenue)))
}

async fn rows_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> ServerResult<Json<RowsResponse>> {
    let report = state.report()?;
    let filtered = query.filter_set()?.apply(&report)?;
    let start = query.start.unwrap_or(0);
    let count = query.count.unwrap_or(50);
    Ok(Json(preview::collect_rows(
        &filtered,
        start,
        count,
        state.config().preview_rows,
    )))
}

// ============================================================================
// Facet helpers
// ============================================================================

/// Distinct non-null values of a column, sorted. Unresolved columns yield
/// an empty list.
fn facet_values(df: &DataFrame, name: Option<&str>) -> ServerResult<Vec<String>> {
    let Some(name) = name else {
        return Ok(vec![]);
    };
    let strings = df
        .column(name)
        .map_err(DashboardError::from)?
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(DashboardError::from)?;

    let mut values = BTreeSet::new();
    for cell in strings.str().map_err(DashboardError::from)?.into_iter().flatten() {
        values.insert(cell.to_string());
    }
    Ok(values.into_iter().collect())
}

/// Min/max of the canonical ISO date column, ignoring nulls.
fn date_span(df: &DataFrame, name: &str) -> ServerResult<(Option<String>, Option<String>)> {
    let column = df.column(name).map_err(DashboardError::from)?;
    let series = column.as_materialized_series();
    let strings = series.str().map_err(DashboardError::from)?;

    let mut min: Option<String> = None;
    let mut max: Option<String> = None;
    for cell in strings.into_iter().flatten() {
        if min.as_deref().is_none_or(|current| cell < current) {
            min = Some(cell.to_string());
        }
        if max.as_deref().is_none_or(|current| cell > current) {
            max = Some(cell.to_string());
        }
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use salesboard_core::DashboardConfig;
    use std::io::Write;
    use tower::util::ServiceExt;

    fn test_router(dir: &tempfile::TempDir) -> Router {
        let path = dir.path().join("report.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Date,Category,Status,Fulfilment,SKU,Qty,Amount,ship-city").unwrap();
        writeln!(file, "04-30-22,Kurta,Shipped,Amazon,SKU-1,1,100,MUMBAI").unwrap();
        writeln!(file, "05-01-22,Set,Shipped,Merchant,SKU-2,2,200,Springfield").unwrap();
        writeln!(file, "05-02-22,Kurta,Cancelled,Amazon,SKU-1,1,300,DELHI").unwrap();

        let config = DashboardConfig::builder().csv_path(path).build().unwrap();
        create_router(Arc::new(AppState::new(config)))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_summary_unfiltered() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 3);
        assert_eq!(body["total_revenue"], 600.0);
        assert_eq!(body["avg_order_value"], 200.0);
    }

    #[tokio::test]
    async fn test_summary_with_filters() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(
            test_router(&dir),
            "/api/summary?categories=Kurta&statuses=Shipped",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 1);
        assert_eq!(body["total_revenue"], 100.0);
    }

    #[tokio::test]
    async fn test_select_all_sentinel_in_query() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json(test_router(&dir), "/api/summary?categories=All").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 3);
    }

    #[tokio::test]
    async fn test_bad_date_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/summary?from=yesterday").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_facets_sorted_with_span() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/facets").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["select_all"], "All");
        assert_eq!(
            body["categories"],
            serde_json::json!(["Kurta", "Set"])
        );
        assert_eq!(body["date_min"], "2022-04-30");
        assert_eq!(body["date_max"], "2022-05-02");
    }

    #[tokio::test]
    async fn test_category_chart() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/charts/categories").await;
        assert_eq!(status, StatusCode::OK);
        let slices = body.as_array().unwrap();
        assert_eq!(slices[0]["label"], "Kurta");
        assert_eq!(slices[0]["revenue"], 400.0);
    }

    #[tokio::test]
    async fn test_city_chart_splits_unmapped() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/charts/cities").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"].as_array().unwrap().len(), 2);
        assert_eq!(body["unmapped"][0]["label"], "Springfield");
    }

    #[tokio::test]
    async fn test_rows_preview() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir), "/api/rows?count=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["total_rows"], 3);
        assert!(
            body["columns"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("Amount"))
        );
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_router(&dir)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(None), Vec::<String>::new());
        assert_eq!(split_list(Some("")), Vec::<String>::new());
        assert_eq!(
            split_list(Some("Kurta, Set ,,Top")),
            vec!["Kurta".to_string(), "Set".to_string(), "Top".to_string()]
        );
    }
}
