//! Integration test utilities for the chat relay
//!
//! This crate provides helpers for running end-to-end tests against
//! the user endpoints and the chat WebSocket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
