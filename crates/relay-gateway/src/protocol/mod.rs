//! Chat wire protocol
//!
//! JSON text frames exchanged over the chat WebSocket.

mod frames;

pub use frames::{ErrorFrame, InboundFrame, OutboundFrame};
