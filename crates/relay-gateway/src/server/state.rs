//! Gateway state
//!
//! Application state shared by every HTTP and WebSocket handler.

use crate::broadcast::BroadcastDispatcher;
use crate::coordinator::ChatContext;
use crate::session::SessionRegistry;
use relay_common::{AppConfig, PasswordService};
use relay_core::{TokenStore, UserStore};
use std::sync::Arc;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Stores, registry and dispatcher used by chat connections
    chat: ChatContext,
    /// Password hashing and policy
    passwords: PasswordService,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(chat: ChatContext, config: AppConfig) -> Self {
        Self {
            passwords: PasswordService::new(config.auth.password_min_length),
            chat,
            config: Arc::new(config),
        }
    }

    /// Get the chat context
    pub fn chat(&self) -> &ChatContext {
        &self.chat
    }

    /// Get the session registry
    pub fn registry(&self) -> &SessionRegistry {
        &self.chat.registry
    }

    /// Get a shared handle to the broadcast dispatcher
    pub fn dispatcher(&self) -> Arc<BroadcastDispatcher> {
        self.chat.dispatcher.clone()
    }

    /// Get the user store
    pub fn users(&self) -> &dyn UserStore {
        self.chat.users.as_ref()
    }

    /// Get the token store
    pub fn tokens(&self) -> &dyn TokenStore {
        self.chat.tokens.as_ref()
    }

    /// Get the password service
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.chat.registry)
            .field("config", &"AppConfig")
            .finish()
    }
}
