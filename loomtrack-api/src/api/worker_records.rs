//! Attendance/payroll record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use loomtrack_common::db::worker_records::{self, RecordQuery};
use loomtrack_common::db::{DateFilter, SortOrder, WorkerRecord};
use loomtrack_common::input::{NewWorkerRecord, WorkerRecordPatch};
use loomtrack_common::lenient::Payload;

use crate::{ApiResult, AppState};

/// Query parameters for listing records
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListParams {
    /// Case-insensitive substring of the worker name
    pub name: Option<String>,
    /// Single day, `YYYY-MM-DD`
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `asc` or `desc` (default)
    pub sort: Option<String>,
}

impl RecordListParams {
    fn into_query(self) -> loomtrack_common::Result<RecordQuery> {
        Ok(RecordQuery {
            dates: DateFilter::from_params(
                self.date.as_deref(),
                self.start_date.as_deref(),
                self.end_date.as_deref(),
            )?,
            sort: SortOrder::from_param(self.sort.as_deref()),
            name: self.name,
        })
    }
}

/// GET /workers/records?name=&date=&startDate=&endDate=&sort=asc|desc
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordListParams>,
) -> ApiResult<Json<Vec<WorkerRecord>>> {
    let query = params.into_query()?;
    Ok(Json(worker_records::list_records(&state.db, &query).await?))
}

/// POST /workers/records
///
/// **Request:** `{"workerName": "Rita", "date": "2024-05-06", "status": "Present", "advance": 50}`
///
/// `workerId` may be sent instead of a name. A name that matches no worker
/// (ignoring case) creates one.
pub async fn create_record(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<WorkerRecord>)> {
    let new = NewWorkerRecord::from_payload(&Payload::from_value(body)?)?;
    let record = worker_records::create_record(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /workers/records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<WorkerRecord>> {
    let patch = WorkerRecordPatch::from_payload(&Payload::from_value(body)?)?;
    Ok(Json(worker_records::update_record(&state.db, &id, &patch).await?))
}

/// DELETE /workers/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    worker_records::delete_record(&state.db, &id).await?;
    Ok(Json(json!({ "message": "Record deleted" })))
}

/// Build worker record routes
pub fn worker_record_routes() -> Router<AppState> {
    Router::new()
        .route("/workers/records", get(list_records).post(create_record))
        .route("/workers/records/:id", put(update_record).delete(delete_record))
}
