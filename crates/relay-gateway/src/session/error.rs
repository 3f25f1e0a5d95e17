//! Session error types

use thiserror::Error;

/// Errors raised while running a chat session
///
/// None of these leave the gateway: the coordinator and the dispatcher log
/// them and either close the connection or skip a single delivery.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The HTTP connection could not be upgraded to a WebSocket
    #[error("Connection upgrade failed: {0}")]
    ConnectionUpgradeFailed(String),

    /// The resumption token is unknown, already used or expired
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// The user the token was issued for could not be loaded
    #[error("User lookup failed: {0}")]
    UserLookupFailed(String),

    /// An inbound frame did not decode into a chat message
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// The message store rejected a message or a history read
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    /// The session is stopped and no longer accepts deliveries
    #[error("Session channel closed")]
    ChannelClosed,

    /// Writing to the transport failed
    #[error("Transport write failed: {0}")]
    TransportWriteFailed(String),
}

impl SessionError {
    /// Short machine-readable name, used as a log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionUpgradeFailed(_) => "connection_upgrade_failed",
            Self::InvalidOrExpiredToken => "invalid_or_expired_token",
            Self::UserLookupFailed(_) => "user_lookup_failed",
            Self::MalformedFrame(_) => "malformed_frame",
            Self::PersistenceFailed(_) => "persistence_failed",
            Self::ChannelClosed => "channel_closed",
            Self::TransportWriteFailed(_) => "transport_write_failed",
        }
    }

    /// Whether the error happened before a session existed
    #[must_use]
    pub fn is_handshake_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionUpgradeFailed(_) | Self::InvalidOrExpiredToken | Self::UserLookupFailed(_)
        )
    }
}
