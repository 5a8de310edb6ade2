//! Route handlers and the shared error-to-response mapping.

pub mod health;
pub mod history;
pub mod transform;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ToneError;

/// Map a [`ToneError`] onto the HTTP status and JSON body callers see.
pub(crate) fn error_response(err: &ToneError) -> (StatusCode, Json<Value>) {
    match err {
        ToneError::Validation(_) | ToneError::EmptyHistory(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        ),
        ToneError::Upstream(details) => {
            warn!(error = %details, "Upstream rewrite failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "API call failed", "details": details })),
            )
        }
        other => {
            warn!(error = %other, "Request failed on storage");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Storage unavailable", "details": other.to_string() })),
            )
        }
    }
}
