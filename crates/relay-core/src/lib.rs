//! # relay-core
//!
//! Domain layer containing entities and the store traits the relay depends on.
//! This crate has zero dependencies on infrastructure (storage, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{Message, ResumptionToken, User, UserRef};
pub use error::StoreError;
pub use traits::{MessageStore, StoreResult, TokenStore, UserStore};
