//! HTTP API for the chat surface
//!
//! This module provides a REST API for driving conversation sessions:
//! - POST /sessions - Mount a new session
//! - GET /sessions/:id - Timeline, state and partial transcript
//! - POST /sessions/:id/messages - Submit typed text
//! - POST /sessions/:id/capture/start|stop - Voice capture control
//! - POST /sessions/:id/reset - Back to the greeting
//! - GET /sessions/:id/notices - Take transient notices
//! - DELETE /sessions/:id - Unmount
//! - GET /suggested-questions - Starter questions
//! - GET /health - Health check

pub mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
