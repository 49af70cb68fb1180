use anyhow::{Context, Result};
use async_nats::Client;
use tracing::info;

use super::messages::{ControlAction, RecognizerControlMessage};

pub struct NatsClient {
    client: Client,
    session_id: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publish a start/stop request to the STT service
    pub async fn publish_control(&self, action: ControlAction, locale: &str) -> Result<()> {
        let subject = format!("stt.control.{}", self.session_id);

        let message = RecognizerControlMessage {
            session_id: self.session_id.clone(),
            action,
            locale: locale.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish recognizer control")?;

        info!("Published {:?} to {} (locale={})", action, subject, locale);

        Ok(())
    }

    /// Subscribe to transcript messages
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        // The STT service publishes to stt.text.partial and stt.text.final;
        // messages are filtered by session_id in the payload
        let subject = "stt.text.>";

        info!("Subscribing to transcripts on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }
}
