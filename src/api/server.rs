//! Axum API server.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::transform::TransformationService;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransformationService>,
}

impl AppState {
    pub fn new(service: Arc<TransformationService>) -> Self {
        Self { service }
    }
}

/// CORS layer for the configured origins; an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/api/health", get(super::routes::health::get_health))
        .route("/api/transform", post(super::routes::transform::transform))
        .route("/api/undo", post(super::routes::history::undo))
        .route("/api/redo", post(super::routes::history::redo))
        .route("/api/reset", post(super::routes::history::reset))
        .route("/api/history", post(super::routes::history::snapshot))
        // Body size limit: 1 MiB.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server and run until the process is stopped.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state, config);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToneError;
    use crate::providers::MockRewriter;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn make_app(rewriter: MockRewriter) -> Router {
        let service = TransformationService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(rewriter),
            300,
            None,
        );
        build_router(AppState::new(Arc::new(service)), &ServerConfig::default())
    }

    fn rewriter_returning(reply: &'static str, times: usize) -> MockRewriter {
        let mut mock = MockRewriter::new();
        mock.expect_complete()
            .times(times)
            .returning(move |_| Ok(reply.to_string()));
        mock
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = make_app(rewriter_returning("unused", 0));
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_transform_without_text_is_400() {
        let app = make_app(rewriter_returning("unused", 0));
        let (status, body) = post_json(&app, "/api/transform", json!({ "tone": 10 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Text is required" }));
    }

    #[tokio::test]
    async fn test_transform_then_undo_with_generated_session() {
        let app = make_app(rewriter_returning("Greetings.", 1));
        let (status, body) =
            post_json(&app, "/api/transform", json!({ "text": "hi", "tone": 90 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transformed"], "Greetings.");
        let sid = body["session_id"].as_str().unwrap().to_string();
        assert!(!sid.is_empty());

        let (status, body) = post_json(&app, "/api/undo", json!({ "session_id": sid })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": "hi" }));

        let (status, body) = post_json(&app, "/api/redo", json!({ "session_id": sid })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": "Greetings." }));
    }

    #[tokio::test]
    async fn test_repeat_transform_served_from_cache_with_new_history_entry() {
        // times(1): the second request must not reach the upstream.
        let app = make_app(rewriter_returning("Good day.", 1));
        let req = json!({ "text": "hi", "tone": 50, "session_id": "s" });
        let (_, first) = post_json(&app, "/api/transform", req.clone()).await;
        let (status, second) = post_json(&app, "/api/transform", req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["transformed"], second["transformed"]);

        let (_, snap) = post_json(&app, "/api/history", json!({ "session_id": "s" })).await;
        assert_eq!(snap["undo_depth"], 2);
        assert_eq!(snap["redo_depth"], 0);
        assert_eq!(snap["current"]["original"], "hi");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_with_details() {
        let mut mock = MockRewriter::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(ToneError::Upstream("HTTP 401 Unauthorized: bad key".into())));
        let app = make_app(mock);

        let (status, body) = post_json(
            &app,
            "/api/transform",
            json!({ "text": "hi", "session_id": "s" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API call failed");
        assert!(body["details"].as_str().unwrap().contains("401"));

        let (status, body) = post_json(&app, "/api/undo", json!({ "session_id": "s" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Nothing to undo" }));
    }

    #[tokio::test]
    async fn test_history_routes_require_session_id() {
        let app = make_app(rewriter_returning("unused", 0));
        for uri in ["/api/undo", "/api/redo", "/api/reset", "/api/history"] {
            let (status, body) = post_json(&app, uri, json!({})).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": "Session ID required" }), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_redo_on_empty_is_400() {
        let app = make_app(rewriter_returning("unused", 0));
        let (status, body) = post_json(&app, "/api/redo", json!({ "session_id": "fresh" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Nothing to redo" }));
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let app = make_app(rewriter_returning("Hello.", 1));
        post_json(
            &app,
            "/api/transform",
            json!({ "text": "hey", "session_id": "r" }),
        )
        .await;

        let (status, body) = post_json(&app, "/api/reset", json!({ "session_id": "r" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "History reset" }));

        let (status, _) = post_json(&app, "/api/undo", json!({ "session_id": "r" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin_by_default() {
        let app = make_app(rewriter_returning("unused", 0));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/transform")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let _layer = cors_layer(&["http://ok.test".into(), "bad\norigin".into()]);
    }
}
