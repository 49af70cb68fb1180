pub mod agent;
pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod language;
pub mod nats;
pub mod playback;
pub mod runtime;
pub mod session;
pub mod suggestions;
pub mod timeline;

pub use agent::{AgentEndpoint, AgentQuery, AgentReply, HttpAgentClient, QueryDispatcher};
pub use capture::{
    CaptureEvent, Microphone, NatsRecognizer, RecognizerEvent, SpeechCaptureAdapter,
    SpeechRecognizer,
};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState};
pub use language::Language;
pub use playback::{AudioPlayer, LoggingPlayer};
pub use runtime::{ServiceSessionFactory, SessionFactory};
pub use session::{
    CaptureState, SessionConfig, SessionController, SessionEvent, SessionHandle, SessionSnapshot,
    SessionStats,
};
pub use timeline::{AudioRef, MessageTimeline, Origin, Turn, TurnStatus};
