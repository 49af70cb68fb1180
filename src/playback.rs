//! Fire-and-forget playback of agent audio replies.

use crate::timeline::AudioRef;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Audio playback capability
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Begin playing the referenced audio
    async fn play(&self, audio: &AudioRef) -> Result<()>;
}

/// Player that only records what would have been played
#[derive(Debug, Default, Clone)]
pub struct LoggingPlayer;

#[async_trait::async_trait]
impl AudioPlayer for LoggingPlayer {
    async fn play(&self, audio: &AudioRef) -> Result<()> {
        info!("Playing agent audio: {}", audio.as_str());
        Ok(())
    }
}

/// Start playback in the background; failures are logged and dropped
pub fn play_detached(player: Arc<dyn AudioPlayer>, audio: AudioRef) {
    tokio::spawn(async move {
        if let Err(e) = player.play(&audio).await {
            warn!("Playback of {} failed: {:#}", audio.as_str(), e);
        }
    });
}
