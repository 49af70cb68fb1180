//! Conversational session management
//!
//! This module provides the `SessionController` state machine that manages:
//! - The message timeline (greeting, user turns, agent replies)
//! - Voice capture through the speech capture adapter
//! - One outstanding agent query at a time, with stale-reply discarding
//! - Transient notices and statistics for the rendering layer

mod config;
mod controller;
mod event;
mod handle;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::{SessionController, MAX_PENDING_NOTICES};
pub use event::{DispatchToken, Notice, NoticeKind, SessionEvent};
pub use handle::{spawn, SessionHandle};
pub use state::CaptureState;
pub use stats::{SessionSnapshot, SessionStats};
