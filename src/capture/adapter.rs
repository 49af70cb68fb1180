use super::microphone::{Microphone, MicrophoneHold};
use super::recognizer::{RecognizerEvent, SpeechRecognizer};
use crate::error::SessionError;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Identifies one activation of the recognizer
pub type CaptureId = u64;

/// Event emitted by an active capture
///
/// Any number of partials, then exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Partial(String),
    Final(String),
    Aborted,
    Failed(String),
}

impl CaptureEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CaptureEvent::Partial(_))
    }
}

/// Event stream of one capture
#[derive(Debug)]
pub struct CaptureFeed {
    pub id: CaptureId,
    pub events: mpsc::Receiver<CaptureEvent>,
}

struct ActiveCapture {
    id: CaptureId,
    _hold: MicrophoneHold,
    stop_requested: bool,
    stop_signal: Option<oneshot::Sender<()>>,
}

/// Wraps a speech recognizer with exclusive microphone ownership
///
/// `begin` acquires the microphone, `end` asks for a graceful stop and
/// `release` gives the microphone back. Release is idempotent and also
/// happens when the adapter is dropped.
pub struct SpeechCaptureAdapter {
    recognizer: Box<dyn SpeechRecognizer>,
    microphone: Microphone,
    stop_grace: Duration,
    active: Option<ActiveCapture>,
    next_id: CaptureId,
}

impl SpeechCaptureAdapter {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        microphone: Microphone,
        stop_grace: Duration,
    ) -> Self {
        Self {
            recognizer,
            microphone,
            stop_grace,
            active: None,
            next_id: 0,
        }
    }

    /// Start a capture in the given locale
    pub async fn begin(&mut self, locale: &str) -> Result<CaptureFeed, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::CaptureUnavailable(
                "a capture is already active".to_string(),
            ));
        }

        let hold = self.microphone.try_acquire().ok_or_else(|| {
            SessionError::CaptureUnavailable("microphone is in use by another capture".to_string())
        })?;

        let raw = match self.recognizer.start(locale).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!("{} refused to start: {:#}", self.recognizer.name(), e);
                drop(hold);
                return Err(SessionError::CaptureUnavailable(e.to_string()));
            }
        };

        self.next_id += 1;
        let id = self.next_id;
        let (stop_tx, stop_rx) = oneshot::channel();
        let (event_tx, event_rx) = mpsc::channel(32);

        tokio::spawn(supervise(id, raw, stop_rx, self.stop_grace, event_tx));

        self.active = Some(ActiveCapture {
            id,
            _hold: hold,
            stop_requested: false,
            stop_signal: Some(stop_tx),
        });

        info!(
            "Capture {} started on {} ({})",
            id,
            self.recognizer.name(),
            locale
        );

        Ok(CaptureFeed {
            id,
            events: event_rx,
        })
    }

    /// Request graceful termination of the active capture
    ///
    /// The terminal event arrives on the feed later; if the recognizer stays
    /// silent past the grace period, one is synthesized.
    pub async fn end(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        if let Some(signal) = active.stop_signal.take() {
            let _ = signal.send(());
        }

        if !active.stop_requested {
            active.stop_requested = true;
            if let Err(e) = self.recognizer.stop().await {
                warn!("Failed to stop {}: {:#}", self.recognizer.name(), e);
            }
        }
    }

    /// Stop the recognizer if needed and give the microphone back
    ///
    /// Returns false when nothing was active.
    pub async fn release(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        if !active.stop_requested {
            if let Err(e) = self.recognizer.stop().await {
                warn!("Failed to stop {}: {:#}", self.recognizer.name(), e);
            }
        }

        info!("Capture {} released", active.id);
        true
    }

    pub fn active_id(&self) -> Option<CaptureId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Turns raw recognizer output into a well-formed capture feed
async fn supervise(
    id: CaptureId,
    mut raw: mpsc::Receiver<RecognizerEvent>,
    mut stop_rx: oneshot::Receiver<()>,
    grace: Duration,
    events: mpsc::Sender<CaptureEvent>,
) {
    let mut latest_partial = String::new();
    let mut deadline: Option<Instant> = None;

    let terminal = loop {
        let next = match deadline {
            Some(at) => match tokio::time::timeout_at(at, raw.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    debug!("Capture {} stop grace elapsed", id);
                    break settle(&latest_partial);
                }
            },
            None => tokio::select! {
                next = raw.recv() => next,
                _ = &mut stop_rx => {
                    deadline = Some(Instant::now() + grace);
                    continue;
                }
            },
        };

        match next {
            Some(RecognizerEvent::Partial(text)) => {
                latest_partial.clone_from(&text);
                if events.send(CaptureEvent::Partial(text)).await.is_err() {
                    return;
                }
            }
            Some(RecognizerEvent::Final(text)) => break CaptureEvent::Final(text),
            Some(RecognizerEvent::Error(reason)) => break CaptureEvent::Failed(reason),
            // A recognizer may close its stream as soon as it is stopped
            None => {
                let stopping = deadline.is_some() || stop_rx.try_recv().is_ok();
                if stopping {
                    break settle(&latest_partial);
                }
                break CaptureEvent::Failed("recognizer stream closed".to_string());
            }
        }
    };

    debug!("Capture {} terminal event: {:?}", id, terminal);
    let _ = events.send(terminal).await;
}

/// Terminal event for a stop that the recognizer never answered
fn settle(latest_partial: &str) -> CaptureEvent {
    if latest_partial.trim().is_empty() {
        CaptureEvent::Aborted
    } else {
        CaptureEvent::Final(latest_partial.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Recognizer that plays back a fixed script
    struct Scripted {
        script: Vec<RecognizerEvent>,
        refuse: bool,
        stops: Arc<AtomicUsize>,
        _tx: Option<mpsc::Sender<RecognizerEvent>>,
    }

    impl Scripted {
        fn new(script: Vec<RecognizerEvent>) -> (Self, Arc<AtomicUsize>) {
            let stops = Arc::new(AtomicUsize::new(0));
            let recognizer = Self {
                script,
                refuse: false,
                stops: Arc::clone(&stops),
                _tx: None,
            };
            (recognizer, stops)
        }
    }

    #[async_trait::async_trait]
    impl SpeechRecognizer for Scripted {
        async fn start(&mut self, _locale: &str) -> Result<mpsc::Receiver<RecognizerEvent>> {
            if self.refuse {
                bail!("permission denied");
            }
            let (tx, rx) = mpsc::channel(16);
            for event in self.script.drain(..) {
                tx.send(event).await?;
            }
            // Keep the stream open like a live recognizer
            self._tx = Some(tx);
            Ok(rx)
        }

        async fn stop(&mut self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self._tx = None;
            Ok(())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    async fn drain(feed: &mut CaptureFeed) -> Vec<CaptureEvent> {
        let mut out = Vec::new();
        while let Some(event) = feed.events.recv().await {
            let done = event.is_terminal();
            out.push(event);
            if done {
                break;
            }
        }
        out
    }

    #[tokio::test]
    async fn test_partials_then_final() {
        let (recognizer, stops) = Scripted::new(vec![
            RecognizerEvent::Partial("a".into()),
            RecognizerEvent::Partial("a b".into()),
            RecognizerEvent::Final("a b c".into()),
        ]);
        let mic = Microphone::new();
        let mut adapter =
            SpeechCaptureAdapter::new(Box::new(recognizer), mic.clone(), Duration::from_millis(50));

        let mut feed = adapter.begin("ur-PK").await.unwrap();
        assert!(mic.is_held());

        let events = drain(&mut feed).await;
        assert_eq!(
            events,
            vec![
                CaptureEvent::Partial("a".into()),
                CaptureEvent::Partial("a b".into()),
                CaptureEvent::Final("a b c".into()),
            ]
        );

        assert!(adapter.release().await);
        assert!(!adapter.release().await);
        assert!(!mic.is_held());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(mic.releases(), 1);
    }

    #[tokio::test]
    async fn test_refused_start_releases_microphone() {
        let (mut recognizer, stops) = Scripted::new(vec![]);
        recognizer.refuse = true;
        let mic = Microphone::new();
        let mut adapter =
            SpeechCaptureAdapter::new(Box::new(recognizer), mic.clone(), Duration::from_millis(50));

        let err = adapter.begin("ur-PK").await.unwrap_err();
        assert!(matches!(err, SessionError::CaptureUnavailable(_)));
        assert!(!mic.is_held());
        assert_eq!(mic.acquisitions(), 1);
        assert_eq!(mic.releases(), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        assert!(!adapter.is_active());
    }

    #[tokio::test]
    async fn test_busy_microphone_is_unavailable() {
        let (recognizer, _) = Scripted::new(vec![]);
        let mic = Microphone::new();
        let _elsewhere = mic.try_acquire().unwrap();
        let mut adapter =
            SpeechCaptureAdapter::new(Box::new(recognizer), mic.clone(), Duration::from_millis(50));

        let err = adapter.begin("en-US").await.unwrap_err();
        assert!(matches!(err, SessionError::CaptureUnavailable(_)));
    }

    #[tokio::test]
    async fn test_end_without_final_uses_latest_partial() {
        let (recognizer, stops) = Scripted::new(vec![
            RecognizerEvent::Partial("میری".into()),
            RecognizerEvent::Partial("میری فصل".into()),
        ]);
        let mic = Microphone::new();
        let mut adapter =
            SpeechCaptureAdapter::new(Box::new(recognizer), mic.clone(), Duration::from_millis(20));

        let mut feed = adapter.begin("ur-PK").await.unwrap();
        assert_eq!(feed.events.recv().await, Some(CaptureEvent::Partial("میری".into())));
        assert_eq!(feed.events.recv().await, Some(CaptureEvent::Partial("میری فصل".into())));

        adapter.end().await;
        adapter.end().await;
        assert_eq!(feed.events.recv().await, Some(CaptureEvent::Final("میری فصل".into())));

        adapter.release().await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!mic.is_held());
    }

    #[tokio::test]
    async fn test_end_without_speech_aborts() {
        let (recognizer, _) = Scripted::new(vec![]);
        let mut adapter = SpeechCaptureAdapter::new(
            Box::new(recognizer),
            Microphone::new(),
            Duration::from_millis(20),
        );

        let mut feed = adapter.begin("ur-PK").await.unwrap();
        adapter.end().await;
        assert_eq!(feed.events.recv().await, Some(CaptureEvent::Aborted));
        assert_eq!(feed.events.recv().await, None);
    }

    #[tokio::test]
    async fn test_recognizer_error_is_terminal() {
        let (recognizer, _) = Scripted::new(vec![
            RecognizerEvent::Partial("x".into()),
            RecognizerEvent::Error("no speech".into()),
            RecognizerEvent::Final("ignored".into()),
        ]);
        let mut adapter = SpeechCaptureAdapter::new(
            Box::new(recognizer),
            Microphone::new(),
            Duration::from_millis(20),
        );

        let mut feed = adapter.begin("ur-PK").await.unwrap();
        let events = drain(&mut feed).await;
        assert_eq!(events.last(), Some(&CaptureEvent::Failed("no speech".into())));
        assert_eq!(feed.events.recv().await, None);
    }

    #[test]
    fn test_settle() {
        assert_eq!(settle("  "), CaptureEvent::Aborted);
        assert_eq!(settle("hi"), CaptureEvent::Final("hi".into()));
    }
}
