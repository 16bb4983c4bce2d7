//! Session middleware configuration.
//!
//! The server-side session only carries the OAuth `state` between the login
//! redirect and the callback, so an in-memory store is enough.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ApiConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopfront_login";

/// Idle lifetime of a login session in seconds (10 minutes).
const SESSION_EXPIRY_SECONDS: i64 = 10 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ApiConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
