use serde::{Deserialize, Serialize};

/// What the STT service should do with the microphone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Start,
    Stop,
}

/// Control message published to the STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognizerControlMessage {
    pub session_id: String,
    pub action: ControlAction,
    pub locale: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// Transcript message received from STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Set when the service gave up on the utterance
    #[serde(default)]
    pub error: Option<String>,
}
