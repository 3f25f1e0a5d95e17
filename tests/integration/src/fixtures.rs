//! Test fixtures and wire types
//!
//! Request and response bodies as a client sees them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration and login request
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub password: String,
}

impl Credentials {
    pub fn unique() -> Self {
        Self {
            user_name: format!("user{}", unique_suffix()),
            password: "password123".to_string(),
        }
    }

    pub fn with_password(&self, password: &str) -> Self {
        Self {
            user_name: self.user_name.clone(),
            password: password.to_string(),
        }
    }
}

/// Registered user
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Login result
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub url: String,
}

/// Presence count
#[derive(Debug, Deserialize)]
pub struct ActiveUsersResponse {
    pub count: usize,
}

/// Error body
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Chat message pushed by the server
#[derive(Debug, Deserialize)]
pub struct ChatFrame {
    pub author: String,
    pub message: String,
    #[serde(rename = "sentAt")]
    pub sent_at: String,
}
