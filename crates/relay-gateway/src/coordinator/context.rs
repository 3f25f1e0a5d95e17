//! Shared dependencies of the per-connection coordinator

use crate::broadcast::BroadcastDispatcher;
use crate::session::SessionRegistry;
use relay_core::{MessageStore, TokenStore, UserStore};
use std::sync::Arc;

/// Everything a chat connection needs, cheap to clone per connection
#[derive(Clone)]
pub struct ChatContext {
    pub registry: Arc<SessionRegistry>,
    pub dispatcher: Arc<BroadcastDispatcher>,
    pub users: Arc<dyn UserStore>,
    pub messages: Arc<dyn MessageStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ChatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatContext")
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
