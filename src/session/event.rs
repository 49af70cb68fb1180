use crate::agent::DispatchOutcome;
use crate::capture::{CaptureEvent, CaptureId};
use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlates an outstanding agent query with its resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchToken(pub(crate) u64);

impl DispatchToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything that can drive the session state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// User pressed the microphone control
    StartCapture,
    /// User let go of the microphone control
    ReleaseCapture,
    /// User typed a message
    SubmitText(String),
    /// Conversation cleared back to the greeting
    Reset,
    /// Output of an active capture
    Capture { capture: CaptureId, event: CaptureEvent },
    /// The dispatcher finished (reply or fallback)
    DispatchResolved {
        token: DispatchToken,
        outcome: DispatchOutcome,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StartCapture => "start capture",
            SessionEvent::ReleaseCapture => "release capture",
            SessionEvent::SubmitText(_) => "submit text",
            SessionEvent::Reset => "reset",
            SessionEvent::Capture { .. } => "capture event",
            SessionEvent::DispatchResolved { .. } => "dispatch resolution",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    CaptureUnavailable,
    CaptureFailed,
    /// A spoken message ran past the message length limit
    TranscriptTooLong,
}

/// Transient message for the user; never part of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    /// Notice for a capture error or an overlong transcript; other errors are not
    /// surfaced this way
    pub fn from_error(error: &SessionError) -> Option<Self> {
        let kind = match error {
            SessionError::CaptureUnavailable(_) => NoticeKind::CaptureUnavailable,
            SessionError::CaptureFailed(_) => NoticeKind::CaptureFailed,
            SessionError::MessageTooLong(_) => NoticeKind::TranscriptTooLong,
            _ => return None,
        };

        Some(Self {
            kind,
            message: error.to_string(),
            raised_at: Utc::now(),
        })
    }
}
