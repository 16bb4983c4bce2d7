//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                - Liveness check
//!
//! # Auth
//! GET   /auth/login            - Redirect to the identity provider
//! GET   /auth/callback         - Handle the provider callback, set credential cookies
//! POST  /auth/refresh          - Renew the access cookie
//! POST  /auth/logout           - Revoke credentials, expire cookies
//!
//! # Users (requires auth)
//! GET   /api/users/me          - Current user
//! PATCH /api/users/{id}        - Partial update (self or admin)
//! ```

pub mod auth;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// All routes of the api.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .nest("/api/users", user_routes())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/{id}", patch(users::update))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}
