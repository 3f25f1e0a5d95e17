//! # relay-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_token, hash_password, validate_password, verify_password, PasswordService,
    TOKEN_LENGTH,
};
pub use config::{
    AppConfig, AppSettings, AuthConfig, ConfigError, Environment, ServerConfig, SessionConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
