//! Agent query dispatch
//!
//! [`QueryDispatcher`] sends a user turn to the remote [`AgentEndpoint`] and
//! always comes back with an agent turn, degrading to a localized apology
//! when the endpoint fails or times out.

pub mod dispatcher;
pub mod endpoint;
pub mod messages;

pub use dispatcher::{DispatchOutcome, QueryDispatcher, DEFAULT_TIMEOUT};
pub use endpoint::{AgentEndpoint, HttpAgentClient};
pub use messages::{AgentQuery, AgentReply};
