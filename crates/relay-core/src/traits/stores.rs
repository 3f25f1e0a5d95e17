//! Store traits (ports) - define the interface for data access
//!
//! The relay core only talks to users, messages and resumption tokens through
//! these traits. The infrastructure layer provides the implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Message, ResumptionToken, User, UserRef};
use crate::error::StoreError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// User Store
// ============================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user; fails with `UsernameTaken` on duplicate usernames
    async fn create(&self, user: &User) -> StoreResult<()>;

    /// Find user by ID
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Find user by username
    async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Advance the user's last activity timestamp.
    ///
    /// Implementations must never move the value backwards.
    async fn update_last_activity(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

// ============================================================================
// Message Store
// ============================================================================

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message; the store assigns the id and the creation time
    async fn create(&self, author: &UserRef, body: &str) -> StoreResult<Message>;

    /// Entire history, ascending by creation time
    async fn all_messages(&self) -> StoreResult<Vec<Message>>;

    /// Messages created strictly after `since`, ascending by creation time
    async fn messages_newer_than(&self, since: DateTime<Utc>) -> StoreResult<Vec<Message>>;
}

// ============================================================================
// Token Store
// ============================================================================

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store a freshly issued token
    async fn create(&self, token: &ResumptionToken) -> StoreResult<()>;

    /// Look up a token; absent and expired tokens both yield `None`
    async fn get(&self, token: &str) -> StoreResult<Option<ResumptionToken>>;

    /// Invalidate a token
    async fn delete(&self, token: &str) -> StoreResult<()>;
}
