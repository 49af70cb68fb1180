use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Agent,
}

/// Lifecycle of a turn in the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// Placeholder shown while the agent reply is outstanding
    Pending,
    /// Regular turn
    Complete,
    /// Agent reply produced locally because the endpoint failed
    Fallback,
}

/// Opaque handle to a playable audio resource (usually a URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(pub String);

impl AudioRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique within the session
    pub id: Uuid,

    pub text: String,

    pub origin: Origin,

    pub created_at: DateTime<Utc>,

    /// Spoken version of the reply, if the agent produced one
    pub audio_ref: Option<AudioRef>,

    pub status: TurnStatus,

    /// Agent confidence (0.0 to 1.0), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Follow-up questions the agent proposed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_questions: Vec<String>,

    /// References the agent cited for the answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl Turn {
    fn new(text: impl Into<String>, origin: Origin, status: TurnStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            origin,
            created_at: Utc::now(),
            audio_ref: None,
            status,
            confidence: None,
            suggested_questions: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User, TurnStatus::Complete)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Agent, TurnStatus::Complete)
    }

    /// Agent turn standing in for a reply that could not be fetched
    pub fn fallback(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Agent, TurnStatus::Fallback)
    }

    /// Empty agent turn displayed while waiting for the reply
    pub fn placeholder() -> Self {
        Self::new(String::new(), Origin::Agent, TurnStatus::Pending)
    }

    pub fn with_audio(mut self, audio_ref: Option<AudioRef>) -> Self {
        self.audio_ref = audio_ref;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }

    pub fn is_fallback(&self) -> bool {
        self.status == TurnStatus::Fallback
    }
}
