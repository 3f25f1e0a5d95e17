//! In-memory implementation of MessageStore

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::instrument;

use relay_core::entities::{Message, UserRef};
use relay_core::traits::{MessageStore, StoreResult};

#[derive(Debug, Default)]
struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
}

/// Append-only message log.
///
/// Creation timestamps are assigned under the write lock and are strictly
/// increasing, so the log is always sorted by `created_at`.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    log: RwLock<MessageLog>,
}

impl InMemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.log.read().messages.len()
    }

    /// Check whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.log.read().messages.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    #[instrument(skip(self, body), fields(author = %author))]
    async fn create(&self, author: &UserRef, body: &str) -> StoreResult<Message> {
        let mut log = self.log.write();

        let mut created_at = Utc::now();
        if let Some(last) = log.messages.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }

        log.next_id += 1;
        let message = Message::new(log.next_id, author.clone(), body.to_string(), created_at);
        log.messages.push(message.clone());

        tracing::debug!(message_id = message.id, "Message stored");

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn all_messages(&self) -> StoreResult<Vec<Message>> {
        Ok(self.log.read().messages.clone())
    }

    #[instrument(skip(self))]
    async fn messages_newer_than(&self, since: DateTime<Utc>) -> StoreResult<Vec<Message>> {
        let log = self.log.read();
        let start = log.messages.partition_point(|m| !m.is_newer_than(since));
        Ok(log.messages[start..].to_vec())
    }
}
