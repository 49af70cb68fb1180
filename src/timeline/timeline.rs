use super::turn::Turn;
use crate::error::SessionError;
use tracing::debug;
use uuid::Uuid;

/// Append-only ordered log of conversation turns
///
/// The only in-place edit allowed is swapping the pending placeholder for
/// its resolved reply. Owned by the session controller; renderers get a
/// read-only slice or a cloned snapshot.
#[derive(Debug, Clone, Default)]
pub struct MessageTimeline {
    turns: Vec<Turn>,
}

impl MessageTimeline {
    /// Create a timeline seeded with a single greeting turn
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::agent(greeting)],
        }
    }

    /// Append a turn and return the new ordered sequence
    ///
    /// A second placeholder is refused while one is still pending.
    pub fn append(&mut self, turn: Turn) -> Result<&[Turn], SessionError> {
        if turn.is_pending() {
            if let Some(pending) = self.pending() {
                return Err(SessionError::PendingTurnMismatch(pending.id));
            }
        }
        debug!("Timeline append {:?} turn {}", turn.origin, turn.id);
        self.turns.push(turn);
        Ok(&self.turns)
    }

    /// Swap the pending placeholder `id` for its resolved content, keeping position
    pub fn replace_pending(&mut self, id: Uuid, mut turn: Turn) -> Result<&Turn, SessionError> {
        let slot = self
            .turns
            .iter_mut()
            .find(|t| t.id == id && t.is_pending())
            .ok_or(SessionError::PendingTurnMismatch(id))?;

        // The placeholder's identity and position are kept
        turn.id = id;
        *slot = turn;
        Ok(slot)
    }

    /// Clear to a single greeting turn
    pub fn reset(&mut self, greeting: impl Into<String>) {
        self.turns.clear();
        self.turns.push(Turn::agent(greeting));
    }

    pub fn pending(&self) -> Option<&Turn> {
        self.turns.iter().find(|t| t.is_pending())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
