//! Login, credential and identity-provider plumbing.

mod error;
pub mod provider;
pub mod tokens;

pub use error::AuthError;
pub use provider::{Identity, IdentityProvider, OAuthProvider};
pub use tokens::{TokenPair, TokenStore};

use rand::Rng;

/// Generate a cryptographically secure random alphanumeric string.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
