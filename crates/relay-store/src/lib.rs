//! # relay-store
//!
//! Store layer implementing the `relay-core` store traits in process memory.
//!
//! ## Overview
//!
//! - [`InMemoryUserStore`]: accounts indexed by id and username
//! - [`InMemoryMessageStore`]: append-only message log ordered by creation time
//! - [`InMemoryTokenStore`]: one-time resumption tokens with expiry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use relay_core::UserStore;
//! use relay_store::InMemoryUserStore;
//!
//! let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
//! ```

pub mod memory;

// Re-export commonly used types
pub use memory::{InMemoryMessageStore, InMemoryTokenStore, InMemoryUserStore};
