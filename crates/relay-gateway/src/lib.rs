//! # relay-gateway
//!
//! Real-time chat relay: WebSocket sessions, broadcast delivery and the user
//! endpoints that issue chat tokens.

pub mod broadcast;
pub mod coordinator;
pub mod protocol;
pub mod server;
pub mod session;

#[cfg(test)]
mod test_support;

pub use server::{create_app, create_gateway_state, run, GatewayState};
