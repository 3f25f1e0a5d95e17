//! A present chat user
//!
//! Each session owns an outbound queue drained by its own task. The task
//! always writes to the session's *current* connection, which the registry
//! can swap when the same user reconnects.

use super::{FrameSink, SessionError};
use crate::protocol::{ErrorFrame, OutboundFrame};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use relay_core::{Message, UserRef};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

type ConnectionSlot = Arc<RwLock<Arc<dyn FrameSink>>>;

/// One user present on one transport connection
pub struct Session {
    /// Unique session ID
    id: Uuid,

    /// Snapshot of the user this session belongs to
    user: UserRef,

    /// Resumption token the session was opened with
    token: String,

    /// Peer address of the first connection
    remote_addr: String,

    joined_at: DateTime<Utc>,

    /// Current transport handle, shared with the drain task
    connection: ConnectionSlot,

    /// Incremented on every connection swap
    epoch: AtomicU64,

    /// Outbound delivery queue
    queue: mpsc::UnboundedSender<Arc<Message>>,

    stop_tx: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl Session {
    /// Create a session and spawn its drain task
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        user: UserRef,
        token: impl Into<String>,
        remote_addr: impl Into<String>,
        connection: Arc<dyn FrameSink>,
    ) -> Arc<Self> {
        let (queue, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let connection: ConnectionSlot = Arc::new(RwLock::new(connection));

        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            user,
            token: token.into(),
            remote_addr: remote_addr.into(),
            joined_at: Utc::now(),
            connection: connection.clone(),
            epoch: AtomicU64::new(0),
            queue,
            stop_tx,
            stopped: AtomicBool::new(false),
        });

        tokio::spawn(drain(session.id, connection, rx, stop_rx));

        tracing::debug!(
            session_id = %session.id,
            user = %session.user,
            remote_addr = %session.remote_addr,
            "Session created"
        );

        session
    }

    /// Get the session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the user snapshot
    pub fn user(&self) -> &UserRef {
        &self.user
    }

    /// Get the resumption token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get the peer address
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// When the session was created
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Current connection epoch
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Current transport handle
    pub fn connection(&self) -> Arc<dyn FrameSink> {
        self.connection.read().clone()
    }

    /// Install a new transport handle and bump the epoch
    ///
    /// Returns the superseded handle and the new epoch. Only the registry
    /// calls this, under its write lock.
    pub(crate) fn replace_connection(&self, connection: Arc<dyn FrameSink>) -> (Arc<dyn FrameSink>, u64) {
        let previous = std::mem::replace(&mut *self.connection.write(), connection);
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        (previous, epoch)
    }

    /// Queue a message for asynchronous delivery
    pub fn deliver(&self, message: Arc<Message>) -> Result<(), SessionError> {
        if self.is_stopped() {
            return Err(SessionError::ChannelClosed);
        }
        self.queue
            .send(message)
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Write a message straight to the current connection, bypassing the queue
    pub async fn send_direct(&self, message: &Message) -> Result<(), SessionError> {
        let json = OutboundFrame::from(message)
            .to_json()
            .map_err(|e| SessionError::TransportWriteFailed(e.to_string()))?;
        self.connection().send_text(json).await
    }

    /// Tell the client that its last message was rejected
    pub async fn send_error(&self, error: &str) -> Result<(), SessionError> {
        let json = ErrorFrame::new(error)
            .to_json()
            .map_err(|e| SessionError::TransportWriteFailed(e.to_string()))?;
        self.connection().send_text(json).await
    }

    /// Stop the drain task; queued deliveries are dropped
    ///
    /// Calling this more than once has no further effect.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        // The drain task may already be gone; that is fine.
        let _ = self.stop_tx.send(true);
        tracing::debug!(session_id = %self.id, user = %self.user, "Session stopped");
    }

    /// Check whether `stop` has been called
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user", &self.user.username)
            .field("remote_addr", &self.remote_addr)
            .field("epoch", &self.epoch())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Drain loop: forward queued messages until stopped
async fn drain(
    session_id: Uuid,
    connection: ConnectionSlot,
    mut rx: mpsc::UnboundedReceiver<Arc<Message>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        let message = tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            next = rx.recv() => match next {
                Some(message) => message,
                None => break,
            },
        };

        let json = match OutboundFrame::from(message.as_ref()).to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Failed to encode message");
                continue;
            }
        };

        let sink = connection.read().clone();
        if let Err(e) = sink.send_text(json).await {
            tracing::warn!(
                session_id = %session_id,
                message_id = message.id,
                error = %e,
                kind = e.kind(),
                "Failed to write message to connection"
            );
        }
    }

    tracing::trace!(session_id = %session_id, "Drain loop ended");
}
