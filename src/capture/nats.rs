// Speech recognizer backed by a remote STT service over NATS

use anyhow::{bail, Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::recognizer::{RecognizerEvent, SpeechRecognizer};
use crate::nats::{ControlAction, NatsClient, TranscriptMessage};

/// Recognizer that asks the STT service to listen and relays its transcripts
///
/// Transcripts for other sessions on the shared subject are ignored.
pub struct NatsRecognizer {
    client: Arc<NatsClient>,
    locale: String,
    listening: bool,
    relay: Option<JoinHandle<()>>,
}

impl NatsRecognizer {
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        let client = NatsClient::connect(url, session_id)
            .await
            .context("Failed to connect speech recognizer")?;

        Ok(Self {
            client: Arc::new(client),
            locale: String::new(),
            listening: false,
            relay: None,
        })
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for NatsRecognizer {
    async fn start(&mut self, locale: &str) -> Result<mpsc::Receiver<RecognizerEvent>> {
        if self.listening {
            bail!("Already listening");
        }

        // A relay from an earlier utterance may still be waiting for its final
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }

        let mut subscriber = self.client.subscribe_transcripts().await?;
        self.client.publish_control(ControlAction::Start, locale).await?;

        let (tx, rx) = mpsc::channel(64);
        let session_id = self.client.session_id().to_string();

        let relay = tokio::spawn(async move {
            info!("Transcript relay started");

            while let Some(msg) = subscriber.next().await {
                let transcript = match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("Failed to parse transcript message: {}", e);
                        continue;
                    }
                };

                let Some((event, terminal)) = transcript_event(transcript, &session_id) else {
                    continue;
                };

                if tx.send(event).await.is_err() || terminal {
                    break;
                }
            }

            info!("Transcript relay stopped");
        });

        self.relay = Some(relay);
        self.locale = locale.to_string();
        self.listening = true;

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.listening {
            return Ok(());
        }

        self.listening = false;
        self.client
            .publish_control(ControlAction::Stop, &self.locale)
            .await
    }

    fn name(&self) -> &str {
        "NATS STT"
    }
}

/// Recognizer event for a transcript addressed to `session_id`, and whether it
/// ends the utterance
///
/// An error wins over the partial flag.
fn transcript_event(msg: TranscriptMessage, session_id: &str) -> Option<(RecognizerEvent, bool)> {
    if msg.session_id != session_id {
        return None;
    }

    Some(match (msg.error, msg.partial) {
        (Some(reason), _) => (RecognizerEvent::Error(reason), true),
        (None, true) => (RecognizerEvent::Partial(msg.text), false),
        (None, false) => (RecognizerEvent::Final(msg.text), true),
    })
}

impl Drop for NatsRecognizer {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }
}
