//! Application configuration structs
//!
//! Loads configuration from environment variables (and an optional `.env` file).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Server bind configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat session settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a freshly issued resumption token
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: i64,
    /// Number of broadcast delivery workers
    #[serde(default = "default_dispatcher_workers")]
    pub dispatcher_workers: usize,
}

/// Account settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

// Default value functions
fn default_app_name() -> String {
    "chat-relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_token_ttl() -> i64 {
    3600 // 1 hour
}

fn default_dispatcher_workers() -> usize {
    50
}

fn default_password_min_length() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            gateway: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            session: SessionConfig {
                token_ttl_seconds: default_token_ttl(),
                dispatcher_workers: default_dispatcher_workers(),
            },
            auth: AuthConfig {
                password_min_length: default_password_min_length(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let dispatcher_workers =
            parse_var(&lookup, "DISPATCHER_WORKERS", default_dispatcher_workers)?;
        if dispatcher_workers == 0 {
            return Err(ConfigError::InvalidValue(
                "DISPATCHER_WORKERS",
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: ServerConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_var(&lookup, "GATEWAY_PORT", default_port)?,
            },
            session: SessionConfig {
                token_ttl_seconds: parse_var(&lookup, "TOKEN_TTL_SECONDS", default_token_ttl)?,
                dispatcher_workers,
            },
            auth: AuthConfig {
                password_min_length: parse_var(
                    &lookup,
                    "PASSWORD_MIN_LENGTH",
                    default_password_min_length,
                )?,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
