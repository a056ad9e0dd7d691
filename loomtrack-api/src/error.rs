//! Error types for loomtrack-api
//!
//! Client faults carry their message to the caller. Store failures are logged
//! in full and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type: a loomtrack-common error rendered as an HTTP response
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub loomtrack_common::Error);

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        use loomtrack_common::Error as Common;

        match self.0 {
            Common::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Common::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            err => {
                error!("Store failure: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_client_error() {
            warn!("Rejected request ({}): {}", status.as_u16(), message);
        }

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
