//! Worker master data endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use loomtrack_common::db::{workers, Worker};
use loomtrack_common::input::{NewWorker, WorkerPatch};
use loomtrack_common::lenient::Payload;

use crate::{ApiResult, AppState};

/// GET /workers
///
/// All workers, name ascending.
pub async fn list_workers(State(state): State<AppState>) -> ApiResult<Json<Vec<Worker>>> {
    Ok(Json(workers::list_workers(&state.db).await?))
}

/// POST /workers
///
/// **Request:** `{"name": "Rita", "dob": "1990-04-01", "dailySalary": 300}`
pub async fn create_worker(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Worker>)> {
    let new = NewWorker::from_payload(&Payload::from_value(body)?)?;
    let worker = workers::create_worker(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}

/// PUT /workers/:id
pub async fn update_worker(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Worker>> {
    let patch = WorkerPatch::from_payload(&Payload::from_value(body)?)?;
    Ok(Json(workers::update_worker(&state.db, &id, &patch).await?))
}

/// DELETE /workers/:id
///
/// Removes the worker together with all of its records.
pub async fn delete_worker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted_records = workers::delete_worker(&state.db, &id).await?;
    Ok(Json(json!({
        "message": "Worker and associated records deleted",
        "deletedRecords": deleted_records,
    })))
}

/// Build worker routes
pub fn worker_routes() -> Router<AppState> {
    Router::new()
        .route("/workers", get(list_workers).post(create_worker))
        .route("/workers/:id", put(update_worker).delete(delete_worker))
}
