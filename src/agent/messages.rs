use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Query sent to the agent endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentQuery {
    pub message: String,
    pub language: Language,
    /// Farm whose data the agent may use as context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<u64>,
}

/// Reply from the agent endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub response_text: String,
    #[serde(default)]
    pub response_audio_url: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_omits_missing_farm() {
        let query = AgentQuery {
            message: "پانی".to_string(),
            language: Language::Ur,
            farm_id: None,
        };
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"language\":\"ur\""));
        assert!(!json.contains("farm_id"));
    }

    #[test]
    fn test_reply_full_payload() {
        let json = r#"{
            "response_text": "ہفتے میں 2-3 بار آبپاشی کریں",
            "response_audio_url": "/api/v1/agent/tts/response_123.mp3",
            "language": "ur",
            "confidence": 0.82,
            "farm_context_used": true,
            "sources": ["Pakistan Agriculture Research Council"],
            "suggested_questions": ["کھاد کب لگائیں؟"],
            "recommended_actions": []
        }"#;

        let reply: AgentReply = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.response_audio_url.as_deref(),
            Some("/api/v1/agent/tts/response_123.mp3")
        );
        assert_eq!(reply.confidence, Some(0.82));
        assert_eq!(reply.language, Some(Language::Ur));
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.suggested_questions, vec!["کھاد کب لگائیں؟"]);
    }

    #[test]
    fn test_reply_minimal_payload() {
        let reply: AgentReply = serde_json::from_str(r#"{"response_text": "ok"}"#).unwrap();
        assert_eq!(reply.response_text, "ok");
        assert!(reply.response_audio_url.is_none());
        assert!(reply.sources.is_empty());
    }
}
