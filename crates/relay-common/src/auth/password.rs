//! Password hashing and verification utilities
//!
//! Uses Argon2id for password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a hash
///
/// # Errors
/// Returns an error if the hash is invalid
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate a password against the configured minimum length
///
/// # Errors
/// Returns a validation error if the password is empty or too short
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::validation("Empty username or password"));
    }

    if password.chars().count() < min_length {
        return Err(AppError::Validation(format!(
            "Password should be at least {min_length} characters"
        )));
    }

    Ok(())
}

/// Password service for dependency injection
#[derive(Debug, Clone)]
pub struct PasswordService {
    min_length: usize,
}

impl PasswordService {
    /// Create a new password service
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Validate and hash a new password
    ///
    /// # Errors
    /// Returns a validation error for weak passwords, or an internal error if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        validate_password(password, self.min_length)?;
        hash_password(password)
    }

    /// Verify a password and return an error if invalid
    ///
    /// # Errors
    /// Returns `AppError::InvalidCredentials` if the password doesn't match
    pub fn verify_or_error(&self, password: &str, hash: &str) -> Result<(), AppError> {
        if verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(8)
    }
}
