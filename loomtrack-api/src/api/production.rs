//! Machine production endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use loomtrack_common::db::production::{self, ProductionQuery};
use loomtrack_common::db::{DateFilter, MachineTotal, Production, SortOrder, WeeklyTotal};
use loomtrack_common::input::{production_from_payload, ProductionPatch};
use loomtrack_common::lenient::Payload;
use loomtrack_common::time::{parse_day, today};

use crate::{ApiResult, AppState};

/// Query parameters for listing production entries
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionListParams {
    pub machine_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
}

/// Query parameters for the per-machine daily totals
#[derive(Debug, Default, Deserialize)]
pub struct MachineTotalsParams {
    /// Day to total, `YYYY-MM-DD`; today when omitted
    pub date: Option<String>,
}

/// Query parameters for the rolling three-week totals
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotalsParams {
    /// Last day of the window; today when omitted
    pub end_date: Option<String>,
    /// Older clients send the window end as `startDate`
    pub start_date: Option<String>,
}

fn day_or_today(param: Option<&str>) -> loomtrack_common::Result<chrono::NaiveDate> {
    match param.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_day(s),
        None => Ok(today()),
    }
}

/// GET /production?machineId=&date=&startDate=&endDate=&sort=asc|desc
pub async fn list_production(
    State(state): State<AppState>,
    Query(params): Query<ProductionListParams>,
) -> ApiResult<Json<Vec<Production>>> {
    let query = ProductionQuery {
        dates: DateFilter::from_params(
            params.date.as_deref(),
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )?,
        sort: SortOrder::from_param(params.sort.as_deref()),
        machine_id: params.machine_id,
    };
    Ok(Json(production::list_production(&state.db, &query).await?))
}

/// GET /production/machine?date=
pub async fn machine_totals(
    State(state): State<AppState>,
    Query(params): Query<MachineTotalsParams>,
) -> ApiResult<Json<Vec<MachineTotal>>> {
    let day = day_or_today(params.date.as_deref())?;
    Ok(Json(production::machine_totals(&state.db, day).await?))
}

/// GET /production/weekly?endDate=
pub async fn weekly_totals(
    State(state): State<AppState>,
    Query(params): Query<WeeklyTotalsParams>,
) -> ApiResult<Json<Vec<WeeklyTotal>>> {
    let end = params.end_date.or(params.start_date);
    let day = day_or_today(end.as_deref())?;
    Ok(Json(production::weekly_totals(&state.db, day).await?))
}

/// POST /production
///
/// **Request:** `{"machineId": "LM-01", "date": "2024-05-06", "machineStatus": "ON",
/// "sareesProduced": 20, "costPerSaree": 10, "warpingCapacity": ""}`
pub async fn create_production(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Production>)> {
    let draft = production_from_payload(&Payload::from_value(body)?)?;
    let entry = production::create_production(&state.db, draft).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /production/:id
///
/// Partial update; `totalCost` is recomputed using stored values for any
/// factor the request leaves out.
pub async fn update_production(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Production>> {
    let patch = ProductionPatch::from_payload(&Payload::from_value(body)?)?;
    Ok(Json(production::update_production(&state.db, &id, &patch).await?))
}

/// DELETE /production/:id
pub async fn delete_production(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    production::delete_production(&state.db, &id).await?;
    Ok(Json(json!({ "message": "Deleted successfully" })))
}

/// Build production routes
pub fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/production", get(list_production).post(create_production))
        .route("/production/machine", get(machine_totals))
        .route("/production/weekly", get(weekly_totals))
        .route("/production/:id", put(update_production).delete(delete_production))
}
