//! In-memory implementation of UserStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;
use uuid::Uuid;

use relay_core::entities::User;
use relay_core::error::StoreError;
use relay_core::traits::{StoreResult, UserStore};

/// In-memory implementation of UserStore
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, User>,
    usernames: DashMap<String, Uuid>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check whether no users are registered
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: &User) -> StoreResult<()> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                tracing::debug!(user_id = %user.id, "User created");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.usernames.get(username).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    #[instrument(skip(self))]
    async fn update_last_activity(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        let mut user = self.users.get_mut(&id).ok_or(StoreError::UserNotFound(id))?;

        if user.advance_activity(at) {
            tracing::trace!(user_id = %id, last_activity = %at, "Last activity advanced");
        }

        Ok(())
    }
}
