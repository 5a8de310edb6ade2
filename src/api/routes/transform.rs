//! `POST /api/transform`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error_response;
use crate::api::server::AppState;
use crate::transform::DEFAULT_TONE;

fn default_tone() -> i64 {
    DEFAULT_TONE
}

/// Request body for `POST /api/transform`.
#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_tone")]
    pub tone: i64,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Rewrite `text` to `tone` and echo the effective session id.
pub async fn transform(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TransformRequest>,
) -> (StatusCode, Json<Value>) {
    match state
        .service
        .transform(body.text.as_deref(), body.tone, body.session_id.as_deref())
        .await
    {
        Ok(out) => (
            StatusCode::OK,
            Json(json!({
                "transformed": out.transformed,
                "session_id": out.session_id,
            })),
        ),
        Err(e) => error_response(&e),
    }
}
