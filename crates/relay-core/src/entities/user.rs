//! User entity - represents a chat user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity as kept by the user store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    /// Timestamp of the newest message this user is known to have received.
    /// `None` until the first delivery or replay.
    pub last_activity: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with a fresh id and no recorded activity
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            last_activity: None,
            created_at: Utc::now(),
        }
    }

    /// Advance `last_activity` to `at`, ignoring timestamps that would move it backwards.
    ///
    /// Returns `true` if the value changed.
    pub fn advance_activity(&mut self, at: DateTime<Utc>) -> bool {
        match self.last_activity {
            Some(current) if current >= at => false,
            _ => {
                self.last_activity = Some(at);
                true
            }
        }
    }

    /// Immutable identity snapshot used by sessions and messages
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Read-only snapshot of the identity fields needed for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

impl std::fmt::Display for UserRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}
