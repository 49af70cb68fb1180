use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Process-wide exclusive microphone
///
/// Create one per process and hand clones to every capture adapter; at most
/// one `MicrophoneHold` exists at any time across all clones.
#[derive(Debug, Clone, Default)]
pub struct Microphone {
    state: Arc<MicrophoneState>,
}

#[derive(Debug, Default)]
struct MicrophoneState {
    in_use: AtomicBool,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
}

impl Microphone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the microphone, or `None` if another capture holds it
    pub fn try_acquire(&self) -> Option<MicrophoneHold> {
        self.state
            .in_use
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        debug!("Microphone acquired");
        Some(MicrophoneHold {
            state: Arc::clone(&self.state),
        })
    }

    pub fn is_held(&self) -> bool {
        self.state.in_use.load(Ordering::SeqCst)
    }

    /// Number of holds handed out so far
    pub fn acquisitions(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of holds released so far
    pub fn releases(&self) -> usize {
        self.state.releases.load(Ordering::SeqCst)
    }
}

/// Exclusive hold on the microphone; released when dropped
#[derive(Debug)]
pub struct MicrophoneHold {
    state: Arc<MicrophoneState>,
}

impl Drop for MicrophoneHold {
    fn drop(&mut self) {
        self.state.in_use.store(false, Ordering::SeqCst);
        self.state.releases.fetch_add(1, Ordering::SeqCst);
        debug!("Microphone released");
    }
}
