//! Resumption token generation

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated resumption tokens
pub const TOKEN_LENGTH: usize = 16;

/// Generate a random alphanumeric token of `TOKEN_LENGTH` characters
#[must_use]
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
