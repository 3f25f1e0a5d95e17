//! Fakes shared by the unit tests

use crate::protocol::OutboundFrame;
use crate::session::{FrameSink, SessionError};
use async_trait::async_trait;
use chrono::Utc;
use relay_core::{Message, UserRef};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// `FrameSink` that records every text frame
#[derive(Debug)]
pub struct RecordingSink {
    tx: mpsc::UnboundedSender<String>,
    fail: AtomicBool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> (Arc<Self>, Frames) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(Self {
            tx,
            fail: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        });
        (sink, Frames { rx })
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send_text(&self, text: String) -> Result<(), SessionError> {
        if self.fail.load(Ordering::SeqCst) || self.is_closed() {
            return Err(SessionError::TransportWriteFailed("broken pipe".to_string()));
        }
        self.tx
            .send(text)
            .map_err(|e| SessionError::TransportWriteFailed(e.to_string()))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Receiving end of a `RecordingSink`
#[derive(Debug)]
pub struct Frames {
    rx: mpsc::UnboundedReceiver<String>,
}

impl Frames {
    pub async fn next_raw(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("sink dropped")
    }

    pub async fn next_outbound(&mut self) -> OutboundFrame {
        let raw = self.next_raw().await;
        serde_json::from_str(&raw).expect("not an outbound chat frame")
    }

    pub fn try_next(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

pub fn author(username: &str) -> UserRef {
    UserRef {
        id: Uuid::new_v4(),
        username: username.to_string(),
    }
}

pub fn message(id: u64, author: &UserRef, body: &str) -> Message {
    Message::new(id, author.clone(), body.to_string(), Utc::now())
}
