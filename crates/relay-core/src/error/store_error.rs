//! Store errors - error types returned by the store traits

use thiserror::Error;
use uuid::Uuid;

/// Errors reported by user, message and token stores
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Token already exists")]
    TokenExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::TokenExists => "TOKEN_EXISTS",
            Self::Backend(_) => "STORE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UsernameTaken(_) | Self::TokenExists)
    }
}
