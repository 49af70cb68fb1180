//! Error taxonomy for the conversational session.

use crate::session::CaptureState;

/// Errors raised inside the session subsystem.
///
/// None of these escape as unhandled failures: capture problems become
/// transient notices, dispatch problems become fallback turns, and stale
/// responses are only logged. The remaining variants reject a command
/// without changing session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("microphone unavailable: {0}")]
    CaptureUnavailable(String),
    #[error("capture stopped without a transcript")]
    CaptureAborted,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("agent dispatch failed: {0}")]
    DispatchFailure(String),
    #[error("stale response for dispatch {0} discarded")]
    StaleResponse(u64),
    #[error("a query is already awaiting a reply")]
    DispatchInFlight,
    #[error("cannot {event} while {from}")]
    InvalidTransition { from: CaptureState, event: &'static str },
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("turn {0} is not the pending placeholder")]
    PendingTurnMismatch(uuid::Uuid),
    #[error("session is closed")]
    SessionClosed,
}

impl SessionError {
    /// Whether the error rejected a user command (nothing changed)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SessionError::DispatchInFlight
                | SessionError::InvalidTransition { .. }
                | SessionError::EmptyMessage
                | SessionError::MessageTooLong(_)
        )
    }
}
