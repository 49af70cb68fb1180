use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route(
            "/suggested-questions",
            get(handlers::get_suggested_questions),
        )
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/sessions/:session_id/stats",
            get(handlers::get_session_stats),
        )
        // Conversation input
        .route(
            "/sessions/:session_id/messages",
            post(handlers::submit_message),
        )
        .route(
            "/sessions/:session_id/capture/start",
            post(handlers::start_capture),
        )
        .route(
            "/sessions/:session_id/capture/stop",
            post(handlers::stop_capture),
        )
        .route("/sessions/:session_id/reset", post(handlers::reset_session))
        .route(
            "/sessions/:session_id/notices",
            get(handlers::take_notices),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
