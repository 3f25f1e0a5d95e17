//! Message broadcasting
//!
//! Delivers stored messages to every present session.

mod dispatcher;

pub use dispatcher::{BroadcastDispatcher, DeliveryTask, DispatcherConfig, DEFAULT_WORKERS};
