//! In-memory implementation of TokenStore

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use relay_core::entities::ResumptionToken;
use relay_core::error::StoreError;
use relay_core::traits::{StoreResult, TokenStore};

/// One-time token store; expired tokens are purged on lookup
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: DashMap<String, ResumptionToken>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, expired ones included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check whether no tokens are stored
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn create(&self, token: &ResumptionToken) -> StoreResult<()> {
        match self.tokens.entry(token.token.clone()) {
            Entry::Occupied(_) => Err(StoreError::TokenExists),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(())
            }
        }
    }

    #[instrument(skip(self, token))]
    async fn get(&self, token: &str) -> StoreResult<Option<ResumptionToken>> {
        let found = self.tokens.get(token).map(|t| t.clone());

        match found {
            Some(t) if t.is_expired() => {
                self.tokens.remove(token);
                tracing::debug!(user_id = %t.user_id, "Expired token purged");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, token: &str) -> StoreResult<()> {
        self.tokens.remove(token);
        Ok(())
    }
}
