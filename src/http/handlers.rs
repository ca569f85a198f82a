use super::state::{AppState, SessionHandle};
use crate::session::{is_valid_session_id, SessionReport, SessionStart, MAX_SESSION_ID_LEN};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Prompt base path (defaults to `prompts.base_path`)
    pub base_path: Option<String>,

    /// Platform attributes such as `callerId`
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RunningSessionResponse {
    pub session_id: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Start a voicemail session whose turns go through the configured transport
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    if !is_valid_session_id(&session_id) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid session id {:?}: use up to {} ASCII letters, digits, '-' or '_'",
                session_id, MAX_SESSION_ID_LEN
            ),
        );
    }

    info!("Starting session: {}", session_id);

    let cancel = CancellationToken::new();
    {
        let mut sessions = state.sessions.write().await;
        state.retention.prune(&mut sessions, Utc::now());
        match sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => {
                return error_response(
                    StatusCode::CONFLICT,
                    format!("Session {} already exists", session_id),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(SessionHandle::new(cancel.clone()));
            }
        }
    }

    let transport = match state.transports.open(&session_id).await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to open turn transport: {:#}", e);
            state.sessions.write().await.remove(&session_id);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to open turn transport: {}", e),
            );
        }
    };

    let start = SessionStart {
        session_id: session_id.clone(),
        base_path: req.base_path.unwrap_or_else(|| state.base_path.clone()),
        attributes: req.attributes,
    };

    let task_state = state.clone();
    tokio::spawn(async move {
        let report = task_state.driver.run_report(start, transport, cancel).await;
        if let Err(e) = task_state.transports.publish_result(&report).await {
            warn!("Failed to publish result for {}: {:#}", report.session_id, e);
        }
        let mut sessions = task_state.sessions.write().await;
        if let Some(handle) = sessions.get_mut(&report.session_id) {
            handle.finish(report);
        }
        task_state.retention.prune(&mut sessions, Utc::now());
    });

    (
        StatusCode::ACCEPTED,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "running".to_string(),
            message: format!("Session {} started", session_id),
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id
/// Running marker, or the final report once the session ended
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(SessionHandle {
            report: Some(report),
            ..
        }) => (StatusCode::OK, Json::<SessionReport>(report.clone())).into_response(),
        Some(handle) => (
            StatusCode::OK,
            Json(RunningSessionResponse {
                session_id: session_id.clone(),
                status: "running".to_string(),
                started_at: handle.started_at,
            }),
        )
            .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        ),
    }
}

/// POST /sessions/:session_id/cancel
/// Interrupt a running session
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(handle) if handle.is_running() => {
            info!("Cancelling session: {}", session_id);
            handle.cancel.cancel();
            (
                StatusCode::ACCEPTED,
                Json(RunningSessionResponse {
                    session_id: session_id.clone(),
                    status: "cancelling".to_string(),
                    started_at: handle.started_at,
                }),
            )
                .into_response()
        }
        Some(_) => error_response(
            StatusCode::CONFLICT,
            format!("Session {} already finished", session_id),
        ),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        ),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
