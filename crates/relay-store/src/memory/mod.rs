//! In-memory store implementations
//!
//! Each store keeps its state behind its own lock; none of them hold a lock
//! across an `.await`.

mod message;
mod token;
mod user;

pub use message::InMemoryMessageStore;
pub use token::InMemoryTokenStore;
pub use user::InMemoryUserStore;
