//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider returned an email that does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shopfront_core::EmailError),

    /// The `state` parameter did not match the one issued at login.
    #[error("invalid OAuth state")]
    StateMismatch,

    /// The callback carried no authorization code.
    #[error("missing authorization code")]
    MissingCode,

    /// The provider denied the authorization request.
    #[error("authorization denied: {0}")]
    Denied(String),

    /// The provider rejected the code exchange or userinfo request.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The login session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Short code passed to the frontend login page.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "invalid_email",
            Self::StateMismatch => "invalid_state",
            Self::MissingCode => "missing_code",
            Self::Denied(_) => "access_denied",
            Self::Provider(_) | Self::Http(_) => "token_exchange",
            Self::Session(_) => "session",
        }
    }
}
