use super::endpoint::AgentEndpoint;
use super::messages::{AgentQuery, AgentReply};
use crate::error::SessionError;
use crate::language::Language;
use crate::timeline::{AudioRef, Turn};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on how long a query may take
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one dispatch: always a turn, plus the failure it absorbed
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub turn: Turn,
    pub failure: Option<SessionError>,
}

/// Sends user text to the agent and turns whatever comes back into a reply turn
///
/// Network errors, timeouts, error statuses and empty replies all yield a
/// localized apology turn instead of an error.
#[derive(Clone)]
pub struct QueryDispatcher {
    endpoint: Arc<dyn AgentEndpoint>,
    timeout: Duration,
}

impl QueryDispatcher {
    pub fn new(endpoint: Arc<dyn AgentEndpoint>, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the agent; always returns a reply turn
    pub async fn send(&self, text: &str, language: Language, farm_id: Option<u64>) -> Turn {
        self.dispatch(text, language, farm_id).await.turn
    }

    /// Ask the agent, keeping the absorbed failure for bookkeeping
    pub async fn dispatch(
        &self,
        text: &str,
        language: Language,
        farm_id: Option<u64>,
    ) -> DispatchOutcome {
        let query = AgentQuery {
            message: text.to_string(),
            language,
            farm_id,
        };

        match self.request(&query).await {
            Ok(reply) => {
                info!(
                    "Agent replied ({} chars, audio={})",
                    reply.response_text.chars().count(),
                    reply.response_audio_url.is_some()
                );
                DispatchOutcome {
                    turn: reply_turn(reply),
                    failure: None,
                }
            }
            Err(err) => {
                warn!("Agent query fell back to apology: {}", err);
                DispatchOutcome {
                    turn: Turn::fallback(language.apology()),
                    failure: Some(err),
                }
            }
        }
    }

    async fn request(&self, query: &AgentQuery) -> Result<AgentReply, SessionError> {
        let reply = tokio::time::timeout(self.timeout, self.endpoint.query(query))
            .await
            .map_err(|_| {
                SessionError::DispatchFailure(format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| SessionError::DispatchFailure(format!("{:#}", e)))?;

        if reply.response_text.trim().is_empty() {
            return Err(SessionError::DispatchFailure("empty reply".to_string()));
        }

        Ok(reply)
    }
}

fn reply_turn(reply: AgentReply) -> Turn {
    let mut turn = Turn::agent(reply.response_text).with_audio(reply.response_audio_url.map(AudioRef));
    turn.confidence = reply.confidence;
    turn.suggested_questions = reply.suggested_questions;
    turn.sources = reply.sources;
    turn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Origin, TurnStatus};
    use anyhow::{anyhow, Result};
    use std::sync::Mutex;

    struct Canned {
        reply: Result<AgentReply, String>,
        delay: Duration,
        seen: Mutex<Vec<AgentQuery>>,
    }

    #[async_trait::async_trait]
    impl AgentEndpoint for Canned {
        async fn query(&self, query: &AgentQuery) -> Result<AgentReply> {
            self.seen.lock().unwrap().push(query.clone());
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map_err(|e| anyhow!(e))
        }
    }

    fn canned(reply: Result<AgentReply, String>, delay: Duration) -> Arc<Canned> {
        Arc::new(Canned {
            reply,
            delay,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn reply(text: &str) -> AgentReply {
        AgentReply {
            response_text: text.to_string(),
            response_audio_url: Some("/tts/1.mp3".to_string()),
            confidence: Some(0.85),
            language: Some(Language::Ur),
            sources: vec!["PARC wheat advisory".to_string()],
            suggested_questions: vec!["کون سی کھاد استعمال کروں؟".to_string()],
        }
    }

    #[tokio::test]
    async fn test_success_maps_to_agent_turn() {
        let endpoint = canned(Ok(reply("جواب")), Duration::ZERO);
        let dispatcher = QueryDispatcher::new(endpoint.clone(), DEFAULT_TIMEOUT);

        let outcome = dispatcher.dispatch("سوال", Language::Ur, Some(7)).await;
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.turn.origin, Origin::Agent);
        assert_eq!(outcome.turn.status, TurnStatus::Complete);
        assert_eq!(outcome.turn.text, "جواب");
        assert_eq!(outcome.turn.audio_ref, Some(AudioRef("/tts/1.mp3".into())));
        assert_eq!(outcome.turn.confidence, Some(0.85));
        assert_eq!(outcome.turn.suggested_questions.len(), 1);
        assert_eq!(outcome.turn.sources, vec!["PARC wheat advisory"]);

        let seen = endpoint.seen.lock().unwrap();
        assert_eq!(seen[0].farm_id, Some(7));
        assert_eq!(seen[0].message, "سوال");
    }

    #[tokio::test]
    async fn test_endpoint_error_falls_back() {
        let endpoint = canned(Err("connection refused".to_string()), Duration::ZERO);
        let dispatcher = QueryDispatcher::new(endpoint, DEFAULT_TIMEOUT);

        let outcome = dispatcher.dispatch("q", Language::En, None).await;
        assert!(outcome.turn.is_fallback());
        assert_eq!(outcome.turn.text, Language::En.apology());
        assert!(outcome.turn.audio_ref.is_none());
        assert!(matches!(outcome.failure, Some(SessionError::DispatchFailure(_))));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let endpoint = canned(Ok(reply("late")), Duration::from_secs(5));
        let dispatcher = QueryDispatcher::new(endpoint, Duration::from_millis(50));

        let turn = dispatcher.send("q", Language::Ur, None).await;
        assert!(turn.is_fallback());
        assert_eq!(turn.text, Language::Ur.apology());
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let endpoint = canned(Ok(reply("   ")), Duration::ZERO);
        let dispatcher = QueryDispatcher::new(endpoint, DEFAULT_TIMEOUT);

        let turn = dispatcher.send("q", Language::Sd, None).await;
        assert!(turn.is_fallback());
        assert_eq!(turn.text, Language::Sd.apology());
    }
}
