//! Per-connection chat loop
//!
//! Resolves a session from the resumption token, replays missed history,
//! then persists and broadcasts every message the client posts.

mod context;
mod coordinator;

pub use context::ChatContext;
pub use coordinator::{CoordinatorState, SessionCoordinator, REJECTED_MESSAGE_ERROR};
