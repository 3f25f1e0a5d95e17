//! Resumption token entity

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// One-time token that lets a user open (or re-attach to) a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ResumptionToken {
    /// Create a token for `user_id` that expires `ttl` from now
    pub fn new(token: String, user_id: Uuid, ttl: Duration) -> Self {
        Self {
            token,
            user_id,
            expires_at: Utc::now() + ttl,
        }
    }

    /// Check expiry against an explicit clock
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check expiry against the current time
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
