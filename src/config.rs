use crate::language::Language;
use crate::session::SessionConfig;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub session: SessionDefaults,
    pub speech: SpeechConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub language: Language,
    pub greeting: Option<String>,
    pub stop_grace_ms: u64,
    pub max_message_chars: usize,
    pub autoplay: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub nats_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "smartcrop-chat".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            api_token: None,
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            language: Language::Ur,
            greeting: None,
            stop_grace_ms: 1500,
            max_message_chars: 2000,
            autoplay: false,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load from `path` (any format the extension names) with `SMARTCROP__*`
    /// environment overrides, e.g. `SMARTCROP__AGENT__BASE_URL`
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SMARTCROP").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Session settings for a newly mounted conversation
    pub fn session_config(&self, language: Option<Language>, farm_id: Option<u64>) -> SessionConfig {
        SessionConfig {
            language: language.unwrap_or(self.session.language),
            farm_id,
            greeting: self.session.greeting.clone(),
            stop_grace: Duration::from_millis(self.session.stop_grace_ms),
            max_message_chars: self.session.max_message_chars,
            autoplay: self.session.autoplay,
            ..SessionConfig::default()
        }
    }
}
