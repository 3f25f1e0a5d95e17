//! Session coordinator
//!
//! Drives one physical connection through
//! `Connecting -> Resolving -> Active -> Closed`.

use super::ChatContext;
use crate::protocol::InboundFrame;
use crate::session::{FrameSink, Session, SessionError, WireFrame};
use futures_util::{Stream, StreamExt};
use relay_core::User;
use std::fmt::Display;
use std::sync::Arc;

/// Error text sent to a client whose message could not be stored
pub const REJECTED_MESSAGE_ERROR: &str = "Message could not be stored";

/// Lifecycle of one chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// WebSocket accepted, nothing resolved yet
    Connecting,
    /// Looking up or creating the session
    Resolving,
    /// Reading frames
    Active,
    /// Torn down
    Closed,
}

/// Per-connection read loop
#[derive(Debug)]
pub struct SessionCoordinator {
    context: ChatContext,
    remote_addr: String,
    state: CoordinatorState,
}

impl SessionCoordinator {
    /// Create a coordinator for a freshly accepted connection
    pub fn new(context: ChatContext, remote_addr: impl Into<String>) -> Self {
        Self {
            context,
            remote_addr: remote_addr.into(),
            state: CoordinatorState::Connecting,
        }
    }

    /// Current state
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    fn transition(&mut self, next: CoordinatorState) {
        tracing::trace!(
            remote_addr = %self.remote_addr,
            from = ?self.state,
            to = ?next,
            "Coordinator state change"
        );
        self.state = next;
    }

    /// Run the connection to completion
    ///
    /// Returns once the client leaves, sends something unreadable, or the
    /// handshake fails. The connection is always closed on return.
    pub async fn run<S, E>(&mut self, token: &str, connection: Arc<dyn FrameSink>, mut frames: S)
    where
        S: Stream<Item = Result<WireFrame, E>> + Unpin + Send,
        E: Display + Send,
    {
        self.transition(CoordinatorState::Resolving);

        let (session, epoch) = match self.resolve(token, &connection).await {
            Ok(resolved) => resolved,
            Err(e) => {
                let stage = if e.is_handshake_error() { "handshake" } else { "replay" };
                tracing::warn!(
                    remote_addr = %self.remote_addr,
                    error = %e,
                    kind = e.kind(),
                    stage,
                    "Session could not be opened"
                );
                self.transition(CoordinatorState::Closed);
                close_connection(&connection, &self.remote_addr).await;
                return;
            }
        };

        self.transition(CoordinatorState::Active);
        self.read_loop(&session, &mut frames).await;
        self.teardown(&session, epoch, &connection).await;
    }

    /// Find or create the session for `token`
    ///
    /// Returns the session and the connection epoch this loop owns.
    async fn resolve(
        &self,
        token: &str,
        connection: &Arc<dyn FrameSink>,
    ) -> Result<(Arc<Session>, u64), SessionError> {
        let ctx = &self.context;

        if let Some(session) = ctx.registry.resolve(token) {
            // The session may be torn down between resolve and swap; the token
            // is already consumed then, so the lookup below rejects it.
            if let Some(swapped) = ctx.registry.swap_connection(&session, connection.clone()) {
                close_connection(&swapped.previous, &self.remote_addr).await;

                tracing::info!(
                    session_id = %session.id(),
                    user = %session.user(),
                    remote_addr = %self.remote_addr,
                    epoch = swapped.epoch,
                    "Session resumed on new connection"
                );

                return Ok((session, swapped.epoch));
            }
        }

        let issued = ctx
            .tokens
            .get(token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token lookup failed");
                SessionError::InvalidOrExpiredToken
            })?
            .ok_or(SessionError::InvalidOrExpiredToken)?;

        let user = ctx
            .users
            .get_by_id(issued.user_id)
            .await
            .map_err(|e| SessionError::UserLookupFailed(e.to_string()))?
            .ok_or_else(|| SessionError::UserLookupFailed(format!("user {} not found", issued.user_id)))?;

        let session = Session::new(user.to_ref(), token, self.remote_addr.clone(), connection.clone());

        if let Err(e) = ctx.tokens.delete(token).await {
            tracing::warn!(user = %session.user(), error = %e, "Failed to invalidate token");
        }

        if let Err(e) = self.replay(&session, &user).await {
            session.stop();
            return Err(e);
        }

        let epoch = session.epoch();
        ctx.registry.bind(token, session.clone());

        tracing::info!(
            session_id = %session.id(),
            user = %session.user(),
            remote_addr = %self.remote_addr,
            "Session created"
        );

        Ok((session, epoch))
    }

    /// Push the messages the user missed straight to the new connection
    async fn replay(&self, session: &Session, user: &User) -> Result<(), SessionError> {
        let ctx = &self.context;

        let missed = match user.last_activity {
            Some(since) => ctx.messages.messages_newer_than(since).await,
            None => ctx.messages.all_messages().await,
        }
        .map_err(|e| SessionError::PersistenceFailed(e.to_string()))?;

        for message in &missed {
            session.send_direct(message).await?;
        }

        if let Some(last) = missed.last() {
            if let Err(e) = ctx.users.update_last_activity(user.id, last.created_at).await {
                tracing::error!(user = %session.user(), error = %e, "Failed to update last activity");
            }
        }

        tracing::debug!(
            session_id = %session.id(),
            replayed = missed.len(),
            "Missed messages replayed"
        );

        Ok(())
    }

    async fn read_loop<S, E>(&self, session: &Arc<Session>, frames: &mut S)
    where
        S: Stream<Item = Result<WireFrame, E>> + Unpin + Send,
        E: Display + Send,
    {
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(WireFrame::Text(text)) => {
                    if let Err(e) = self.handle_text(session, &text).await {
                        tracing::warn!(
                            session_id = %session.id(),
                            error = %e,
                            kind = e.kind(),
                            "Closing session"
                        );
                        return;
                    }
                }
                Ok(WireFrame::Binary(len)) => {
                    let e = SessionError::MalformedFrame(format!("binary frame of {len} bytes"));
                    tracing::warn!(session_id = %session.id(), error = %e, "Closing session");
                    return;
                }
                Ok(WireFrame::Control) => {
                    tracing::trace!(session_id = %session.id(), "Control frame received");
                }
                Ok(WireFrame::Close) => {
                    tracing::info!(session_id = %session.id(), "Client closed connection");
                    return;
                }
                Err(e) => {
                    tracing::debug!(session_id = %session.id(), error = %e, "Connection read failed");
                    return;
                }
            }
        }
    }

    /// Store and broadcast one posted message
    ///
    /// Only a malformed frame is fatal; a store failure is reported to the
    /// client and the connection stays open.
    async fn handle_text(&self, session: &Arc<Session>, text: &str) -> Result<(), SessionError> {
        let inbound = InboundFrame::from_json(text).map_err(|e| SessionError::MalformedFrame(e.to_string()))?;

        match self.context.messages.create(session.user(), &inbound.message).await {
            Ok(message) => {
                tracing::debug!(
                    session_id = %session.id(),
                    message_id = message.id,
                    preview = message.preview(32),
                    "Message received"
                );
                self.context.dispatcher.broadcast(Arc::new(message));
            }
            Err(e) => {
                let e = SessionError::PersistenceFailed(e.to_string());
                tracing::error!(session_id = %session.id(), error = %e, "Message rejected");

                if let Err(e) = session.send_error(REJECTED_MESSAGE_ERROR).await {
                    tracing::warn!(session_id = %session.id(), error = %e, "Failed to send error frame");
                }
            }
        }

        Ok(())
    }

    async fn teardown(&mut self, session: &Arc<Session>, epoch: u64, connection: &Arc<dyn FrameSink>) {
        self.transition(CoordinatorState::Closed);

        if self.context.registry.release(session, epoch) {
            session.stop();
            tracing::info!(
                session_id = %session.id(),
                user = %session.user(),
                connected_for_secs = (chrono::Utc::now() - session.joined_at()).num_seconds(),
                "Session closed"
            );
        } else {
            tracing::debug!(
                session_id = %session.id(),
                epoch,
                "Connection superseded, session kept"
            );
        }

        close_connection(connection, &self.remote_addr).await;
    }
}

async fn close_connection(connection: &Arc<dyn FrameSink>, remote_addr: &str) {
    if let Err(e) = connection.close().await {
        tracing::debug!(remote_addr = %remote_addr, error = %e, "Connection close failed");
    }
}
