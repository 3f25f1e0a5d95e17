//! Authentication utilities

mod password;
mod token;

pub use password::{hash_password, validate_password, verify_password, PasswordService};
pub use token::{generate_token, TOKEN_LENGTH};
