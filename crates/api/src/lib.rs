//! Shopfront api library.
//!
//! Issues and renews the session credentials and stores user records with
//! their cart and wishlist. The binary in `main.rs` adds Sentry and serves
//! [`app`]; tests drive the same router in process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ApiConfig;
pub use state::AppState;

/// Build the complete router with session and tracing layers.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
