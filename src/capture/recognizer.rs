use anyhow::Result;
use tokio::sync::mpsc;

/// Raw event produced by a speech recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// Interim hypothesis; replaces any earlier partial
    Partial(String),
    /// Final transcript for the utterance
    Final(String),
    /// Recognizer gave up (no speech, network, engine error)
    Error(String),
}

/// Speech recognition capability trait
///
/// Implementations:
/// - NATS: drives a remote STT service over control/transcript subjects
/// - Test doubles: scripted event sequences
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start recognizing speech in the given locale (e.g. "ur-PK")
    ///
    /// Returns a channel receiver that will receive recognizer events.
    /// Fails if the device denies microphone access.
    async fn start(&mut self, locale: &str) -> Result<mpsc::Receiver<RecognizerEvent>>;

    /// Ask the recognizer to finish the utterance
    ///
    /// The final transcript may still arrive on the receiver afterwards.
    async fn stop(&mut self) -> Result<()>;

    /// Get recognizer name for logging
    fn name(&self) -> &str;
}
