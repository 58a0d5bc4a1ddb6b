//! HTTP request handlers for API endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::aggregation::{CategoryValue, SeriesAggregation};
use crate::funding_record::RecordField;
use crate::selection::SelectionOptions;
use crate::views::{
    investor_view, overall_view, startup_view, InvestorView, OverallParams, OverallView,
    StartupView,
};

/// Health check endpoint
///
/// Returns a simple status response with the number of loaded records
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let dataset = state.dataset().await;
    Json(json!({
        "status": "ok",
        "records": dataset.len(),
    }))
}

/// GET /selection - Sidebar choices (modes, startups, investors, years)
pub async fn get_selection(State(state): State<Arc<AppState>>) -> Json<SelectionOptions> {
    let dataset = state.dataset().await;
    Json(SelectionOptions::from_dataset(&dataset))
}

/// GET /overview?year=2019&metric=count - Market overview page
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverallParams>,
) -> Json<OverallView> {
    let dataset = state.dataset().await;
    Json(overall_view(&dataset, &params))
}

/// GET /startups/{name} - Startup drill-down
pub async fn get_startup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<StartupView>, ApiError> {
    let dataset = state.dataset().await;
    let view = startup_view(&dataset, &name)?;
    Ok(Json(view))
}

/// GET /investors/{name} - Investor drill-down
pub async fn get_investor(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<InvestorView>, ApiError> {
    let dataset = state.dataset().await;
    let view = investor_view(&dataset, &name)?;
    Ok(Json(view))
}

/// Response for a grouped aggregate
#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub field: RecordField,
    pub aggregation: SeriesAggregation,
    pub groups: Vec<CategoryValue>,
}

/// GET /aggregate/{op}/{field} - Sum or count grouped by a categorical field
pub async fn get_aggregate(
    State(state): State<Arc<AppState>>,
    Path((op, field)): Path<(String, String)>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let aggregation: SeriesAggregation = op.parse()?;
    let field: RecordField = field.parse()?;

    let dataset = state.dataset().await;
    let records = dataset.records();
    let groups = match aggregation {
        SeriesAggregation::Sum => records.sum_by(field),
        SeriesAggregation::Count => records.count_by(field),
    };

    Ok(Json(AggregateResponse {
        field,
        aggregation,
        groups,
    }))
}

/// Response for a dataset reload
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Whether the file content changed since the last load
    pub refreshed: bool,
    pub records: usize,
}

/// POST /dataset/reload - Re-read the source file through the cache
pub async fn reload_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let loaded = state.reload().await?;
    Ok(Json(ReloadResponse {
        refreshed: loaded.refreshed,
        records: loaded.dataset.len(),
    }))
}
