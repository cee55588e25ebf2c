//! Axum route handlers for the session API consumed by the rendering layer.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_stream::StreamExt;
use tracing::warn;

use crate::errors::AppError;
use crate::session::controller::SubmitOutcome;
use crate::session::lifecycle::SessionView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct CopyResponse {
    pub copied: bool,
    pub session: SessionView,
}

/// GET /api/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.controller.view())
}

/// PUT /api/session/primary
pub async fn handle_set_primary(
    State(state): State<AppState>,
    payload: Result<Json<TextInput>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(input) = payload?;
    Ok(Json(state.controller.set_primary(input.text)))
}

/// PUT /api/session/context
pub async fn handle_set_context(
    State(state): State<AppState>,
    payload: Result<Json<TextInput>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(input) = payload?;
    Ok(Json(state.controller.set_context(input.text)))
}

/// POST /api/session/submit
///
/// Resolves once the optimization service answers. A rejected submission
/// (empty résumé, or one already in flight) is a 200 with `outcome: "rejected"`.
pub async fn handle_submit(State(state): State<AppState>) -> Json<SubmitResponse> {
    let outcome = state.controller.submit().await;
    Json(SubmitResponse {
        outcome,
        session: state.controller.view(),
    })
}

/// POST /api/session/copy
pub async fn handle_copy(State(state): State<AppState>) -> Json<CopyResponse> {
    let copied = state.controller.copy_result().await;
    Json(CopyResponse {
        copied,
        session: state.controller.view(),
    })
}

/// GET /api/session/events (SSE stream)
///
/// `session` events carry a `SessionView` on every change, starting with the current one.
/// `notification` events carry user-facing failure notices.
pub async fn handle_session_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let sessions = WatchStream::new(state.controller.subscribe()).map(|session| {
        let json = serde_json::to_string(&session.view()).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().event("session").data(json))
    });

    let notifications =
        BroadcastStream::new(state.controller.notifications()).filter_map(|result| match result {
            Ok(notification) => {
                let json = serde_json::to_string(&notification).unwrap_or_default();
                Some(Ok(Event::default().event("notification").data(json)))
            }
            Err(e) => {
                warn!("Notification stream lagged: {e}");
                None
            }
        });

    Sse::new(sessions.merge(notifications)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
