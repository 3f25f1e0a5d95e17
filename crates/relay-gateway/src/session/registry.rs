//! Session registry
//!
//! Maps resumption tokens to live sessions and tracks which sessions are
//! present. Both maps sit behind one lock so a reader never sees a token
//! mapping without the matching presence entry.

use super::{FrameSink, Session};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct RegistryState {
    /// Token to live session
    by_token: HashMap<String, Arc<Session>>,

    /// Present sessions by session ID
    present: HashMap<Uuid, Arc<Session>>,
}

/// Result of swapping a session onto a new connection
pub struct SwappedConnection {
    /// Connection that was replaced; the caller closes it
    pub previous: Arc<dyn FrameSink>,
    /// Session epoch after the swap
    pub epoch: u64,
}

/// Registry of live chat sessions
#[derive(Default)]
pub struct SessionRegistry {
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Look up the live session bound to a token
    pub fn resolve(&self, token: &str) -> Option<Arc<Session>> {
        self.state.read().by_token.get(token).cloned()
    }

    /// Bind a token to a session and mark the session present
    ///
    /// A session previously bound to the same token loses its presence.
    pub fn bind(&self, token: &str, session: Arc<Session>) {
        let mut state = self.state.write();

        if let Some(previous) = state.by_token.insert(token.to_string(), session.clone()) {
            if previous.id() != session.id() {
                state.present.remove(&previous.id());
                tracing::debug!(
                    session_id = %previous.id(),
                    replaced_by = %session.id(),
                    "Token rebound to a new session"
                );
            }
        }

        state.present.insert(session.id(), session.clone());

        tracing::debug!(
            session_id = %session.id(),
            user = %session.user(),
            "Session bound"
        );
    }

    /// Move a session onto a new connection
    ///
    /// Bumps the session epoch and marks it present. The superseded
    /// connection is returned for the caller to close. Returns `None` when
    /// the session was torn down after it was resolved: it no longer owns
    /// its token or has been stopped.
    pub fn swap_connection(
        &self,
        session: &Arc<Session>,
        connection: Arc<dyn FrameSink>,
    ) -> Option<SwappedConnection> {
        let mut state = self.state.write();

        let owns_token = state
            .by_token
            .get(session.token())
            .is_some_and(|bound| bound.id() == session.id());
        if !owns_token || session.is_stopped() {
            tracing::debug!(session_id = %session.id(), "Swap refused, session gone");
            return None;
        }

        let (previous, epoch) = session.replace_connection(connection);
        state.present.insert(session.id(), session.clone());

        tracing::debug!(session_id = %session.id(), epoch, "Session connection swapped");

        Some(SwappedConnection { previous, epoch })
    }

    /// Forget a session: drop its token mapping and presence entry
    pub fn remove(&self, session: &Session) {
        let mut state = self.state.write();
        Self::remove_locked(&mut state, session);
    }

    /// Remove a session only if its connection epoch is still `epoch`
    ///
    /// Returns whether the session was removed. A read loop whose
    /// connection has been superseded gets `false` and must leave the
    /// session alone.
    pub fn release(&self, session: &Session, epoch: u64) -> bool {
        let mut state = self.state.write();

        if session.epoch() != epoch {
            return false;
        }

        Self::remove_locked(&mut state, session);
        true
    }

    fn remove_locked(state: &mut RegistryState, session: &Session) {
        let owns_token = state
            .by_token
            .get(session.token())
            .is_some_and(|bound| bound.id() == session.id());
        if owns_token {
            state.by_token.remove(session.token());
        }

        if state.present.remove(&session.id()).is_some() {
            tracing::debug!(session_id = %session.id(), user = %session.user(), "Session removed");
        }
    }

    /// Snapshot of all present sessions
    pub fn list_present(&self) -> Vec<Arc<Session>> {
        self.state.read().present.values().cloned().collect()
    }

    /// Number of present sessions
    pub fn present_count(&self) -> usize {
        self.state.read().present.len()
    }

    /// Check whether a session is present
    pub fn is_present(&self, session_id: Uuid) -> bool {
        self.state.read().present.contains_key(&session_id)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionRegistry")
            .field("tokens", &state.by_token.len())
            .field("present", &state.present.len())
            .finish()
    }
}

impl std::fmt::Debug for SwappedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwappedConnection")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
