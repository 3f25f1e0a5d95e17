//! Chat frame formats
//!
//! Clients send `{"message": "..."}`. The server pushes
//! `{"author": "...", "message": "...", "sentAt": "<RFC 3339>"}` for chat
//! traffic and `{"error": "..."}` when a message was rejected.

use chrono::{DateTime, Utc};
use relay_core::Message;
use serde::{Deserialize, Serialize};

/// Frame sent by a client to post a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub message: String,
}

impl InboundFrame {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Chat message pushed to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub author: String,
    pub message: String,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

impl OutboundFrame {
    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Message> for OutboundFrame {
    fn from(message: &Message) -> Self {
        Self {
            author: message.author.username.clone(),
            message: message.body.clone(),
            sent_at: message.created_at,
        }
    }
}

/// Notification that a posted message was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
}

impl ErrorFrame {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
