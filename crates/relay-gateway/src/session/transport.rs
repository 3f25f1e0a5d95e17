//! Transport handle
//!
//! A session writes through a `FrameSink` so the physical connection can be
//! swapped underneath it when a client reconnects. Inbound traffic is read
//! as a stream of `WireFrame`s.

use super::SessionError;
use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::sync::Mutex;

/// Write half of a message-oriented duplex connection
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Send one text frame
    async fn send_text(&self, text: String) -> Result<(), SessionError>;

    /// Close the connection
    async fn close(&self) -> Result<(), SessionError>;
}

/// `FrameSink` over the write half of an axum WebSocket
pub struct WebSocketSink {
    sink: Mutex<SplitSink<WebSocket, WsMessage>>,
}

impl WebSocketSink {
    /// Wrap the write half of a split socket
    pub fn new(sink: SplitSink<WebSocket, WsMessage>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send_text(&self, text: String) -> Result<(), SessionError> {
        self.sink
            .lock()
            .await
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| SessionError::TransportWriteFailed(e.to_string()))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| SessionError::TransportWriteFailed(e.to_string()))
    }
}

/// Frame read from the client, reduced to what the chat loop cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    /// Text frame
    Text(String),
    /// Binary frame of the given length
    Binary(usize),
    /// Ping or pong
    Control,
    /// Close frame
    Close,
}

impl From<WsMessage> for WireFrame {
    fn from(message: WsMessage) -> Self {
        match message {
            WsMessage::Text(text) => Self::Text(text),
            WsMessage::Binary(data) => Self::Binary(data.len()),
            WsMessage::Ping(_) | WsMessage::Pong(_) => Self::Control,
            WsMessage::Close(_) => Self::Close,
        }
    }
}

impl std::fmt::Debug for WebSocketSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketSink").finish_non_exhaustive()
    }
}
