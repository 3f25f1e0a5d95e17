//! Session management
//!
//! Present users, their transport handles and the registry that tracks them.

mod error;
mod registry;
mod session;
mod transport;

pub use error::SessionError;
pub use registry::{SessionRegistry, SwappedConnection};
pub use session::Session;
pub use transport::{FrameSink, WebSocketSink, WireFrame};
