//! Session history routes: undo, redo, reset and a read-only snapshot.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error_response;
use crate::api::server::AppState;

/// Body shared by every history route.
#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /api/undo` — returns the original text of the undone rewrite.
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> (StatusCode, Json<Value>) {
    match state.service.undo(body.session_id.as_deref()).await {
        Ok(pair) => (StatusCode::OK, Json(json!({ "text": pair.original }))),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/redo` — returns the transformed text of the redone rewrite.
pub async fn redo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> (StatusCode, Json<Value>) {
    match state.service.redo(body.session_id.as_deref()).await {
        Ok(pair) => (StatusCode::OK, Json(json!({ "text": pair.transformed }))),
        Err(e) => error_response(&e),
    }
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> (StatusCode, Json<Value>) {
    match state.service.reset(body.session_id.as_deref()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "History reset" }))),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/history` — stack depths and the latest pair, without mutating.
pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> (StatusCode, Json<Value>) {
    match state.service.snapshot(body.session_id.as_deref()).await {
        Ok(snap) => (
            StatusCode::OK,
            Json(serde_json::to_value(snap).unwrap_or_else(|_| json!({}))),
        ),
        Err(e) => error_response(&e),
    }
}
