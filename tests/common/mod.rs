// Test doubles for the speech recognizer and the agent endpoint.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use smartcrop_chat::{
    AgentEndpoint, AgentQuery, AgentReply, Language, Microphone, QueryDispatcher, RecognizerEvent,
    SessionConfig, SessionController, SessionError, SpeechCaptureAdapter, SpeechRecognizer,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Test-side controls of a `FakeRecognizer`
#[derive(Clone, Default)]
pub struct RecognizerRemote {
    tx: Arc<Mutex<Option<mpsc::Sender<RecognizerEvent>>>>,
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
}

impl RecognizerRemote {
    pub async fn emit(&self, event: RecognizerEvent) {
        let tx = self.tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }

    pub async fn partial(&self, text: &str) {
        self.emit(RecognizerEvent::Partial(text.to_string())).await;
    }

    pub async fn final_text(&self, text: &str) {
        self.emit(RecognizerEvent::Final(text.to_string())).await;
    }

    /// Close the event stream without a terminal event
    pub fn hang_up(&self) {
        self.tx.lock().unwrap().take();
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Recognizer whose events are pushed by the test
#[derive(Default)]
pub struct FakeRecognizer {
    remote: RecognizerRemote,
    pub fail_start: bool,
    pub fail_stop: bool,
}

impl FakeRecognizer {
    pub fn new() -> (Self, RecognizerRemote) {
        let recognizer = Self::default();
        let remote = recognizer.remote.clone();
        (recognizer, remote)
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn start(&mut self, _locale: &str) -> Result<mpsc::Receiver<RecognizerEvent>> {
        self.remote.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            bail!("permission denied");
        }
        let (tx, rx) = mpsc::channel(16);
        *self.remote.tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.remote.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            bail!("recognizer did not acknowledge stop");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Agent endpoint answering `reply to <message>`
pub struct FakeAgent {
    pub delay: Duration,
    pub fail: bool,
    pub gate: Option<Arc<Semaphore>>,
    pub queries: Mutex<Vec<AgentQuery>>,
}

impl FakeAgent {
    pub fn instant() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            fail: false,
            gate: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            fail: false,
            gate: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            fail: true,
            gate: None,
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Replies only after the test adds a permit to the returned gate
    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let agent = Arc::new(Self {
            delay: Duration::ZERO,
            fail: false,
            gate: Some(Arc::clone(&gate)),
            queries: Mutex::new(Vec::new()),
        });
        (agent, gate)
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

pub fn reply_for(message: &str) -> String {
    format!("reply to {}", message)
}

#[async_trait::async_trait]
impl AgentEndpoint for FakeAgent {
    async fn query(&self, query: &AgentQuery) -> Result<AgentReply> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(anyhow!("503 Service Unavailable"));
        }

        Ok(AgentReply {
            response_text: reply_for(&query.message),
            response_audio_url: Some("/api/v1/agent/tts/response_123.mp3".to_string()),
            confidence: Some(0.85),
            language: Some(query.language),
            sources: vec!["Pakistan Agriculture Research Council".to_string()],
            suggested_questions: vec![],
        })
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub microphone: Microphone,
    pub recognizer: RecognizerRemote,
}

pub fn harness(recognizer: FakeRecognizer, agent: Arc<FakeAgent>, timeout: Duration) -> Harness {
    let config = SessionConfig {
        language: Language::Ur,
        stop_grace: Duration::from_millis(50),
        ..SessionConfig::default()
    };
    harness_with_config(recognizer, agent, timeout, config)
}

pub fn harness_with_config(
    recognizer: FakeRecognizer,
    agent: Arc<FakeAgent>,
    timeout: Duration,
    config: SessionConfig,
) -> Harness {
    let remote = recognizer.remote.clone();
    let microphone = Microphone::new();
    let capture = SpeechCaptureAdapter::new(Box::new(recognizer), microphone.clone(), config.stop_grace);
    let dispatcher = QueryDispatcher::new(agent, timeout);

    Harness {
        controller: SessionController::new(config, capture, dispatcher),
        microphone,
        recognizer: remote,
    }
}

pub fn default_harness(agent: Arc<FakeAgent>) -> Harness {
    let (recognizer, _) = FakeRecognizer::new();
    harness(recognizer, agent, Duration::from_secs(30))
}

/// Apply the next internal event, failing the test if none arrives
pub async fn step(controller: &mut SessionController) -> Result<(), SessionError> {
    tokio::time::timeout(Duration::from_secs(5), controller.process_next())
        .await
        .expect("no session event within 5s")
}
