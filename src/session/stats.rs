use super::event::Notice;
use super::state::CaptureState;
use crate::language::Language;
use crate::timeline::Turn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a conversational session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// When the session was mounted
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Turns currently in the timeline
    pub turns_count: usize,

    /// Agent queries sent
    pub dispatches: usize,

    /// Queries answered with a fallback apology
    pub fallbacks: usize,

    /// Voice captures started
    pub captures: usize,

    /// Late replies discarded after a reset
    pub stale_responses: usize,
}

/// Read-only view of a session for renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,

    pub language: Language,

    pub state: CaptureState,

    /// Latest partial transcript while recording; never a committed turn
    pub partial_text: Option<String>,

    pub turns: Vec<Turn>,

    /// True while a reply is outstanding; input should be disabled
    pub awaiting_reply: bool,

    pub last_error: Option<String>,

    /// Notices not yet taken by the renderer
    pub notices: Vec<Notice>,
}
