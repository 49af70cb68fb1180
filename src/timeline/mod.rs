//! Message timeline
//!
//! Ordered, append-only log of user and agent turns. A single placeholder
//! turn may be pending at a time while the agent reply is outstanding.

mod timeline;
mod turn;

pub use timeline::MessageTimeline;
pub use turn::{AudioRef, Origin, Turn, TurnStatus};
