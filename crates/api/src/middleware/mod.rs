//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, login `state` only)

pub mod auth;
pub mod cookies;
pub mod session;

pub use auth::RequireUser;
pub use cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
pub use session::create_session_layer;
