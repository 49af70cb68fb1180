//! Session state machine.
//!
//! Valid transitions:
//! - Idle -> Recording (voice capture started)
//! - Recording -> Dispatching (final transcript committed)
//! - Recording -> Idle (capture aborted or failed)
//! - Idle -> Dispatching (typed text submitted)
//! - Dispatching -> Idle (agent reply or fallback applied)
//! - any -> Idle (session reset)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the session is in the capture/dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    /// Ready for voice or typed input
    #[default]
    Idle,
    /// Microphone held; partial transcripts may be arriving
    Recording,
    /// Waiting for the agent to answer
    Dispatching,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Recording => write!(f, "Recording"),
            CaptureState::Dispatching => write!(f, "Dispatching"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Recording)
                | (CaptureState::Idle, CaptureState::Dispatching)
                | (CaptureState::Recording, CaptureState::Dispatching)
                | (CaptureState::Recording, CaptureState::Idle)
                | (CaptureState::Dispatching, CaptureState::Idle)
        )
    }

    /// Whether new input (voice or typed) is accepted
    pub fn accepts_input(&self) -> bool {
        *self == CaptureState::Idle
    }
}
