//! Message entity - represents a chat message

use chrono::{DateTime, Utc};

use super::UserRef;

/// Message entity
///
/// Immutable once created. The store assigns `id` and `created_at` at
/// persistence time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub author: UserRef,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: u64, author: UserRef, body: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            body,
            created_at,
        }
    }

    /// Check if the message was created strictly after `since`
    #[inline]
    pub fn is_newer_than(&self, since: DateTime<Utc>) -> bool {
        self.created_at > since
    }

    /// Get a truncated preview of the message (for logs)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.body.len() <= max_len {
            &self.body
        } else {
            let mut end = max_len;
            while !self.body.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.body[..end]
        }
    }
}
