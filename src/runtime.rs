//! Wiring of sessions to their collaborators.

use crate::agent::{AgentEndpoint, HttpAgentClient, QueryDispatcher};
use crate::capture::{Microphone, NatsRecognizer, RecognizerEvent, SpeechCaptureAdapter, SpeechRecognizer};
use crate::config::Config;
use crate::language::Language;
use crate::playback::{AudioPlayer, LoggingPlayer};
use crate::session::{self, SessionController, SessionHandle};
use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Builds running sessions for the surfaces that mount them
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, language: Option<Language>, farm_id: Option<u64>) -> Result<SessionHandle>;
}

/// Sessions talking to the HTTP agent and the NATS speech service
pub struct ServiceSessionFactory {
    config: Arc<Config>,
    microphone: Microphone,
    endpoint: Arc<dyn AgentEndpoint>,
    player: Arc<dyn AudioPlayer>,
}

impl ServiceSessionFactory {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let endpoint = HttpAgentClient::new(&config.agent.base_url, config.agent.api_token.clone())?;

        Ok(Self {
            config,
            microphone: Microphone::new(),
            endpoint: Arc::new(endpoint),
            player: Arc::new(LoggingPlayer),
        })
    }
}

#[async_trait::async_trait]
impl SessionFactory for ServiceSessionFactory {
    async fn create(&self, language: Option<Language>, farm_id: Option<u64>) -> Result<SessionHandle> {
        let session_config = self.config.session_config(language, farm_id);

        let recognizer: Box<dyn SpeechRecognizer> =
            match NatsRecognizer::connect(&self.config.speech.nats_url, session_config.session_id.clone()).await {
                Ok(recognizer) => Box::new(recognizer),
                Err(e) => {
                    warn!("Voice input disabled for {}: {:#}", session_config.session_id, e);
                    Box::new(UnavailableRecognizer)
                }
            };

        let capture = SpeechCaptureAdapter::new(
            recognizer,
            self.microphone.clone(),
            session_config.stop_grace,
        );
        let dispatcher = QueryDispatcher::new(Arc::clone(&self.endpoint), self.config.agent.timeout());

        let controller = SessionController::new(session_config, capture, dispatcher)
            .with_player(Arc::clone(&self.player));

        Ok(session::spawn(controller))
    }
}

/// Stand-in when the speech service cannot be reached; typed input still works
pub struct UnavailableRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for UnavailableRecognizer {
    async fn start(&mut self, _locale: &str) -> Result<mpsc::Receiver<RecognizerEvent>> {
        bail!("speech service is not reachable")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
