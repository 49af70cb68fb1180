use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a conversational session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "session-4f1c...")
    pub session_id: String,

    /// Language for queries, recognition locale and canned texts
    pub language: Language,

    /// Farm forwarded to the agent as context
    pub farm_id: Option<u64>,

    /// Greeting override; defaults to the language's greeting
    pub greeting: Option<String>,

    /// How long to wait for the recognizer's final transcript after a stop
    /// Default: 1.5 seconds
    pub stop_grace: Duration,

    /// Longest typed message accepted
    pub max_message_chars: usize,

    /// Play agent audio replies as they arrive
    pub autoplay: bool,
}

impl SessionConfig {
    pub fn greeting(&self) -> String {
        self.greeting
            .clone()
            .unwrap_or_else(|| self.language.greeting().to_string())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            language: Language::Ur,
            farm_id: None,
            greeting: None,
            stop_grace: Duration::from_millis(1500),
            max_message_chars: 2000,
            autoplay: false,
        }
    }
}
