pub mod health;

use axum::{
    http::Uri,
    routing::{get, post, put},
    Router,
};

use crate::errors::AppError;
use crate::session::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session API
        .route("/api/session", get(handlers::handle_get_session))
        .route("/api/session/primary", put(handlers::handle_set_primary))
        .route("/api/session/context", put(handlers::handle_set_context))
        .route("/api/session/submit", post(handlers::handle_submit))
        .route("/api/session/copy", post(handlers::handle_copy))
        .route("/api/session/events", get(handlers::handle_session_events))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::clipboard::testing::RecordingClipboard;
    use crate::config::Config;
    use crate::session::controller::testing::{FakeOptimizer, Reply};
    use crate::session::controller::SubmissionController;

    fn test_state(reply: Reply) -> (AppState, Arc<RecordingClipboard>) {
        let clipboard = Arc::new(RecordingClipboard::default());
        let controller =
            SubmissionController::new(Arc::new(FakeOptimizer::new(reply)), clipboard.clone());
        let config = Config {
            optimizer_api_url: "http://optimizer.test".to_string(),
            optimizer_timeout_secs: 5,
            clipboard_enabled: false,
            port: 0,
            rust_log: "debug".to_string(),
        };
        (AppState { controller, config }, clipboard)
    }

    async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_reports_optimizer() {
        let (state, _) = test_state(Reply::Missing);
        let (status, body) = send(&state, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["optimizer_api_url"], "http://optimizer.test");
    }

    #[tokio::test]
    async fn test_initial_session_is_idle() {
        let (state, _) = test_state(Reply::Missing);
        let (status, body) = send(&state, Method::GET, "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "idle");
        assert_eq!(body["can_submit"], false);
        assert_eq!(body["can_copy"], false);
        assert_eq!(body["result"], Value::Null);
    }

    #[tokio::test]
    async fn test_set_primary_enables_submit() {
        let (state, _) = test_state(Reply::Missing);
        let (status, body) = send(
            &state,
            Method::PUT,
            "/api/session/primary",
            Some(json!({"text": "John Doe"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary"], "John Doe");
        assert_eq!(body["can_submit"], true);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (state, _) = test_state(Reply::Missing);
        let (status, body) = send(
            &state,
            Method::PUT,
            "/api/session/context",
            Some(json!({"wrong": 1})),
        )
        .await;
        assert!(status.is_client_error());
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_submit_with_empty_primary_is_rejected() {
        let (state, _) = test_state(Reply::Text("ok".to_string()));
        let (status, body) = send(&state, Method::POST, "/api/session/submit", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "rejected");
        assert_eq!(body["reason"], "empty_primary");
        assert_eq!(body["session"]["status"], "idle");
    }

    #[tokio::test]
    async fn test_submit_then_copy() {
        let (state, clipboard) = test_state(Reply::Text("Senior Engineer...".to_string()));
        send(
            &state,
            Method::PUT,
            "/api/session/primary",
            Some(json!({"text": "cv"})),
        )
        .await;

        let (_, body) = send(&state, Method::POST, "/api/session/submit", None).await;
        assert_eq!(body["outcome"], "succeeded");
        assert_eq!(body["session"]["result"], "Senior Engineer...");
        assert_eq!(body["session"]["can_copy"], true);

        let (_, body) = send(&state, Method::POST, "/api/session/copy", None).await;
        assert_eq!(body["copied"], true);
        assert_eq!(body["session"]["copied"], true);
        assert_eq!(clipboard.writes(), vec!["Senior Engineer..."]);
    }

    #[tokio::test]
    async fn test_failed_submit_reports_failed() {
        let (state, _) = test_state(Reply::Unavailable);
        send(
            &state,
            Method::PUT,
            "/api/session/primary",
            Some(json!({"text": "x"})),
        )
        .await;

        let (_, body) = send(&state, Method::POST, "/api/session/submit", None).await;
        assert_eq!(body["outcome"], "failed");
        assert_eq!(body["session"]["status"], "failed");
        assert_eq!(body["session"]["result"], Value::Null);
        assert_eq!(body["session"]["can_submit"], true);
    }

    #[tokio::test]
    async fn test_copy_before_result_is_noop() {
        let (state, clipboard) = test_state(Reply::Missing);
        let (status, body) = send(&state, Method::POST, "/api/session/copy", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copied"], false);
        assert!(clipboard.writes().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (state, _) = test_state(Reply::Missing);
        let (status, body) = send(&state, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_events_stream_starts_with_current_session() {
        let (state, _) = test_state(Reply::Missing);
        state.controller.set_primary("cv".to_string());

        let request = Request::builder()
            .uri("/api/session/events")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let mut frames = response.into_body().into_data_stream();
        let first = frames.next().await.unwrap().unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.contains("event: session"));
        assert!(text.contains(r#""primary":"cv""#));
    }
}
