use super::config::SessionConfig;
use super::event::{DispatchToken, Notice, SessionEvent};
use super::state::CaptureState;
use super::stats::{SessionSnapshot, SessionStats};
use crate::agent::{DispatchOutcome, QueryDispatcher};
use crate::capture::{CaptureEvent, CaptureFeed, CaptureId, SpeechCaptureAdapter};
use crate::error::SessionError;
use crate::playback::{play_detached, AudioPlayer};
use crate::timeline::{MessageTimeline, Origin, Turn};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Oldest notices are dropped beyond this many
pub const MAX_PENDING_NOTICES: usize = 8;

/// The query currently awaiting a reply
#[derive(Debug, Clone, Copy)]
struct InFlight {
    token: DispatchToken,
    placeholder: Uuid,
}

#[derive(Debug, Default)]
struct Counters {
    dispatches: usize,
    fallbacks: usize,
    captures: usize,
    stale_responses: usize,
}

/// Conversational session: timeline, capture lifecycle and agent dispatch
///
/// Every transition happens inside [`handle`](Self::handle), one event at a
/// time. Capture feeds and dispatch results come back as events on an
/// internal channel, drained with [`process_next`](Self::process_next) or by
/// the actor loop in [`spawn`](super::spawn).
pub struct SessionController {
    config: SessionConfig,
    state: CaptureState,
    timeline: MessageTimeline,
    partial: Option<String>,
    capture: SpeechCaptureAdapter,
    dispatcher: QueryDispatcher,
    player: Option<Arc<dyn AudioPlayer>>,
    in_flight: Option<InFlight>,
    next_token: u64,
    last_error: Option<SessionError>,
    notices: Vec<Notice>,
    counters: Counters,
    started_at: DateTime<Utc>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    /// Mount a session: Idle, with a single greeting turn
    pub fn new(
        config: SessionConfig,
        capture: SpeechCaptureAdapter,
        dispatcher: QueryDispatcher,
    ) -> Self {
        info!("Creating conversation session: {}", config.session_id);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let timeline = MessageTimeline::with_greeting(config.greeting());

        Self {
            config,
            state: CaptureState::Idle,
            timeline,
            partial: None,
            capture,
            dispatcher,
            player: None,
            in_flight: None,
            next_token: 0,
            last_error: None,
            notices: Vec::new(),
            counters: Counters::default(),
            started_at: Utc::now(),
            events_tx,
            events_rx,
        }
    }

    /// Attach an audio player for agent replies (used when autoplay is on)
    pub fn with_player(mut self, player: Arc<dyn AudioPlayer>) -> Self {
        self.player = Some(player);
        self
    }

    /// Apply one event to completion
    ///
    /// Returns an error only when a user command is refused in the current
    /// state; the session is left untouched in that case.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        debug!("Session {} handling {} in {}", self.config.session_id, event.name(), self.state);

        match event {
            SessionEvent::StartCapture => self.start_capture().await,
            SessionEvent::ReleaseCapture => self.release_capture().await,
            SessionEvent::SubmitText(text) => self.submit_text(&text),
            SessionEvent::Reset => {
                self.reset().await;
                Ok(())
            }
            SessionEvent::Capture { capture, event } => self.on_capture(capture, event).await,
            SessionEvent::DispatchResolved { token, outcome } => {
                self.on_dispatch_resolved(token, outcome);
                Ok(())
            }
        }
    }

    /// Wait for the next internal event (capture output or dispatch result) and apply it
    pub async fn process_next(&mut self) -> Result<(), SessionError> {
        match self.events_rx.recv().await {
            Some(event) => self.handle(event).await,
            None => Err(SessionError::SessionClosed),
        }
    }

    pub(crate) async fn next_internal(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    async fn start_capture(&mut self) -> Result<(), SessionError> {
        if !self.state.accepts_input() {
            return Err(self.refuse("start capture"));
        }

        match self.capture.begin(self.config.language.locale()).await {
            Ok(feed) => {
                self.transition(CaptureState::Recording)?;
                self.partial = None;
                self.counters.captures += 1;
                self.forward_capture(feed);
                Ok(())
            }
            Err(err) => {
                warn!("Capture unavailable: {}", err);
                self.raise_notice(&err);
                Ok(())
            }
        }
    }

    async fn release_capture(&mut self) -> Result<(), SessionError> {
        if self.state != CaptureState::Recording {
            return Err(self.refuse("release capture"));
        }

        // The terminal event follows on the capture feed
        self.capture.end().await;
        Ok(())
    }

    fn submit_text(&mut self, text: &str) -> Result<(), SessionError> {
        match self.state {
            CaptureState::Dispatching => return Err(SessionError::DispatchInFlight),
            CaptureState::Recording => return Err(self.refuse("submit text")),
            CaptureState::Idle => {}
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_chars {
            return Err(SessionError::MessageTooLong(self.config.max_message_chars));
        }

        self.transition(CaptureState::Dispatching)?;
        self.begin_dispatch(text.to_string())
    }

    async fn on_capture(&mut self, capture: CaptureId, event: CaptureEvent) -> Result<(), SessionError> {
        if self.state != CaptureState::Recording || self.capture.active_id() != Some(capture) {
            debug!("Ignoring {:?} from finished capture {}", event, capture);
            return Ok(());
        }

        match event {
            CaptureEvent::Partial(text) => {
                self.partial = Some(text);
                Ok(())
            }
            CaptureEvent::Final(text) => {
                self.finish_capture().await;
                let text = text.trim();
                if text.is_empty() {
                    info!("Capture {} ended with an empty transcript", capture);
                    return self.transition(CaptureState::Idle);
                }
                if text.chars().count() > self.config.max_message_chars {
                    let err = SessionError::MessageTooLong(self.config.max_message_chars);
                    warn!("Capture {} transcript dropped: {}", capture, err);
                    self.raise_notice(&err);
                    return self.transition(CaptureState::Idle);
                }
                self.transition(CaptureState::Dispatching)?;
                self.begin_dispatch(text.to_string())
            }
            CaptureEvent::Aborted => {
                self.finish_capture().await;
                info!("Capture {} aborted", capture);
                self.transition(CaptureState::Idle)
            }
            CaptureEvent::Failed(reason) => {
                self.finish_capture().await;
                let err = SessionError::CaptureFailed(reason);
                warn!("Capture {}: {}", capture, err);
                self.raise_notice(&err);
                self.transition(CaptureState::Idle)
            }
        }
    }

    fn on_dispatch_resolved(&mut self, token: DispatchToken, outcome: DispatchOutcome) {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.token == token => in_flight,
            _ => {
                self.counters.stale_responses += 1;
                debug!("{}", SessionError::StaleResponse(token.value()));
                return;
            }
        };
        self.in_flight = None;

        match outcome.failure {
            Some(failure) => {
                self.counters.fallbacks += 1;
                self.last_error = Some(failure);
            }
            None => self.last_error = None,
        }

        let audio = outcome.turn.audio_ref.clone();
        if let Err(e) = self.timeline.replace_pending(in_flight.placeholder, outcome.turn) {
            error!("Dispatch {} lost its placeholder: {}", token, e);
        }

        if let Err(e) = self.transition(CaptureState::Idle) {
            error!("Dispatch {} resolved outside Dispatching: {}", token, e);
            self.state = CaptureState::Idle;
        }

        if self.config.autoplay {
            if let (Some(player), Some(audio)) = (&self.player, audio) {
                play_detached(Arc::clone(player), audio);
            }
        }
    }

    /// Return to a single greeting turn, dropping anything in progress
    pub async fn reset(&mut self) {
        if self.is_pristine() {
            debug!("Session {} already reset", self.config.session_id);
            return;
        }

        info!("Resetting session {} from {}", self.config.session_id, self.state);

        if self.capture.release().await {
            info!("Capture released by reset");
        }
        if let Some(in_flight) = self.in_flight.take() {
            info!("Dispatch {} superseded by reset", in_flight.token);
        }

        self.partial = None;
        self.last_error = None;
        self.notices.clear();
        self.timeline.reset(self.config.greeting());
        self.state = CaptureState::Idle;
    }

    /// Release the microphone before the session is discarded
    pub async fn shutdown(&mut self) {
        if self.capture.release().await {
            info!("Capture released on shutdown of {}", self.config.session_id);
        }
        self.in_flight = None;
    }

    fn is_pristine(&self) -> bool {
        let greeting = self.config.greeting();
        self.state == CaptureState::Idle
            && self.in_flight.is_none()
            && !self.capture.is_active()
            && self.notices.is_empty()
            && self.last_error.is_none()
            && matches!(
                self.timeline.turns(),
                [only] if only.origin == Origin::Agent && only.text == greeting
            )
    }

    fn begin_dispatch(&mut self, text: String) -> Result<(), SessionError> {
        let placeholder = Turn::placeholder();
        let placeholder_id = placeholder.id;

        self.timeline.append(Turn::user(text.clone()))?;
        self.timeline.append(placeholder)?;

        self.next_token += 1;
        let token = DispatchToken(self.next_token);
        self.in_flight = Some(InFlight {
            token,
            placeholder: placeholder_id,
        });
        self.counters.dispatches += 1;

        info!("Dispatching query {} for session {}", token, self.config.session_id);

        let dispatcher = self.dispatcher.clone();
        let events = self.events_tx.clone();
        let language = self.config.language;
        let farm_id = self.config.farm_id;

        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&text, language, farm_id).await;
            // The session may be gone by now
            let _ = events.send(SessionEvent::DispatchResolved { token, outcome });
        });

        Ok(())
    }

    fn forward_capture(&self, mut feed: CaptureFeed) {
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            while let Some(event) = feed.events.recv().await {
                let terminal = event.is_terminal();
                let forwarded = SessionEvent::Capture {
                    capture: feed.id,
                    event,
                };
                if events.send(forwarded).is_err() || terminal {
                    break;
                }
            }
        });
    }

    async fn finish_capture(&mut self) {
        self.capture.release().await;
        self.partial = None;
    }

    fn transition(&mut self, target: CaptureState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(&target) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                event: "change state",
            });
        }
        debug!("Session state: {} -> {}", self.state, target);
        self.state = target;
        Ok(())
    }

    fn refuse(&self, event: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            from: self.state,
            event,
        }
    }

    fn raise_notice(&mut self, err: &SessionError) {
        if let Some(notice) = Notice::from_error(err) {
            if self.notices.len() >= MAX_PENDING_NOTICES {
                let dropped = self.notices.len() + 1 - MAX_PENDING_NOTICES;
                self.notices.drain(..dropped);
            }
            self.notices.push(notice);
        }
    }

    /// Hand pending notices to the renderer; each is surfaced once
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn timeline(&self) -> &MessageTimeline {
        &self.timeline
    }

    pub fn turns(&self) -> &[Turn] {
        self.timeline.turns()
    }

    /// Latest partial transcript of the active capture
    pub fn partial_text(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    pub fn awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_token(&self) -> Option<DispatchToken> {
        self.in_flight.map(|f| f.token)
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            language: self.config.language,
            state: self.state,
            partial_text: self.partial.clone(),
            turns: self.timeline.turns().to_vec(),
            awaiting_reply: self.awaiting_reply(),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
            notices: self.notices.clone(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            turns_count: self.timeline.len(),
            dispatches: self.counters.dispatches,
            fallbacks: self.counters.fallbacks,
            captures: self.counters.captures,
            stale_responses: self.counters.stale_responses,
        }
    }
}
