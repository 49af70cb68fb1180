use super::state::AppState;
use crate::error::SessionError;
use crate::language::Language;
use crate::session::{SessionHandle, SessionSnapshot};
use crate::suggestions::{is_category, suggested_questions, SuggestedQuestion};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Conversation language (default from configuration)
    pub language: Option<Language>,

    /// Farm used as agent context
    pub farm_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    /// Present only when the requested category exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub questions: Vec<SuggestedQuestion>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

fn rejection_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::DispatchInFlight | SessionError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        SessionError::EmptyMessage | SessionError::MessageTooLong(_) => StatusCode::BAD_REQUEST,
        SessionError::SessionClosed => StatusCode::GONE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Run a session command and answer with the resulting snapshot
async fn command<F, Fut>(state: &AppState, session_id: &str, run: F) -> Response
where
    F: FnOnce(SessionHandle) -> Fut,
    Fut: Future<Output = (SessionHandle, Result<(), SessionError>)>,
{
    let Some(session) = state.session(session_id).await else {
        return session_not_found(session_id);
    };

    match run(session).await {
        (session, Ok(())) => (StatusCode::ACCEPTED, Json(session.snapshot())).into_response(),
        (_, Err(e)) if e.is_rejection() => {
            info!("Session {} refused command: {}", session_id, e);
            error_response(rejection_status(&e), e.to_string())
        }
        (_, Err(e)) => {
            warn!("Session {} command failed: {}", session_id, e);
            error_response(rejection_status(&e), e.to_string())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Mount a new conversation session
///
/// An empty body uses the configured defaults; anything else must be a
/// valid `CreateSessionRequest`.
pub async fn create_session(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice::<CreateSessionRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                info!("Rejected session request: {}", e);
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid session request: {}", e),
                );
            }
        }
    };

    let session = match state.factory.create(req.language, req.farm_id).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create session: {:#}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create session: {}", e),
            );
        }
    };

    let session_id = session.session_id().to_string();
    let snapshot = session.snapshot();

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Session mounted: {}", session_id);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            snapshot,
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id
/// Current timeline, state and partial transcript
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.session(&session_id).await {
        Some(session) => (StatusCode::OK, Json(session.snapshot())).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/stats
pub async fn get_session_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(rejection_status(&e), e.to_string()),
    }
}

/// POST /sessions/:session_id/messages
/// Submit typed text to the agent
pub async fn submit_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> impl IntoResponse {
    command(&state, &session_id, |session| async move {
        let result = session.submit_text(req.text).await;
        (session, result)
    })
    .await
}

/// POST /sessions/:session_id/capture/start
/// Press the microphone control
pub async fn start_capture(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    command(&state, &session_id, |session| async move {
        let result = session.start_capture().await;
        (session, result)
    })
    .await
}

/// POST /sessions/:session_id/capture/stop
/// Release the microphone control
pub async fn stop_capture(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    command(&state, &session_id, |session| async move {
        let result = session.release_capture().await;
        (session, result)
    })
    .await
}

/// POST /sessions/:session_id/reset
/// Clear the conversation back to the greeting
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    command(&state, &session_id, |session| async move {
        let result = session.reset().await;
        (session, result)
    })
    .await
}

/// GET /sessions/:session_id/notices
/// Take pending transient notices (each is returned once)
pub async fn take_notices(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.take_notices().await {
        Ok(notices) => (StatusCode::OK, Json(notices)).into_response(),
        Err(e) => error_response(rejection_status(&e), e.to_string()),
    }
}

/// DELETE /sessions/:session_id
/// Unmount a session; it shuts down once the last handle is gone
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let removed = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match removed {
        Some(_) => {
            info!("Session unmounted: {}", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /suggested-questions
/// Canned starter questions, optionally for one category
pub async fn get_suggested_questions(Query(query): Query<SuggestionsQuery>) -> impl IntoResponse {
    let questions = suggested_questions(query.category.as_deref());
    let category = query.category.filter(|c| is_category(c));
    (
        StatusCode::OK,
        Json(SuggestionsResponse {
            category,
            questions,
        }),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
