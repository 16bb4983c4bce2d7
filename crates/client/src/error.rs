//! Client error type.
//!
//! Every fallible client operation returns [`ClientError`]. Callers that only
//! need to decide how to react (toast, re-sync, send to login) match on
//! [`ClientError::kind`], a closed set of categories.

use reqwest::StatusCode;
use thiserror::Error;

use shopfront_core::PatchError;

use crate::storage::StorageError;

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection failed or was interrupted.
    Network,
    /// The request exceeded the client timeout.
    Timeout,
    /// The api rejected the credentials and no refresh was attempted.
    Unauthorized,
    /// The refresh exchange failed; the visitor has to sign in again.
    SessionExpired,
    /// Authenticated, but not allowed to act on the resource.
    Forbidden,
    /// The resource does not exist.
    NotFound,
    /// The payload was rejected, locally or by the api.
    Validation,
    /// The api failed.
    Server,
    /// The response body could not be decoded.
    Decode,
    /// Local persisted storage failed.
    Storage,
}

/// Errors returned by the Shopfront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The api answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    /// Still unauthorized after the single refresh-and-retry.
    #[error("not authenticated")]
    Unauthorized,

    /// The refresh credential was missing, expired or rejected.
    #[error("session expired, sign in again")]
    SessionExpired,

    /// A patch failed validation and was not sent.
    #[error("invalid update: {0}")]
    Validation(#[from] PatchError),

    /// A response or request body failed to (de)serialize.
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request path could not be resolved against the api base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Local persisted storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(err) if err.is_timeout() => ErrorKind::Timeout,
            Self::Http(err) if err.is_decode() => ErrorKind::Decode,
            Self::Http(_) => ErrorKind::Network,
            Self::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
                StatusCode::FORBIDDEN => ErrorKind::Forbidden,
                StatusCode::NOT_FOUND => ErrorKind::NotFound,
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ErrorKind::Validation
                }
                _ => ErrorKind::Server,
            },
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Validation(_) | Self::InvalidUrl(_) => ErrorKind::Validation,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether the error means the visitor is not signed in.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unauthorized | ErrorKind::SessionExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode) -> ClientError {
        ClientError::Status {
            status: code,
            message: String::new(),
        }
    }

    #[test]
    fn test_status_kinds() {
        assert_eq!(status(StatusCode::FORBIDDEN).kind(), ErrorKind::Forbidden);
        assert_eq!(status(StatusCode::NOT_FOUND).kind(), ErrorKind::NotFound);
        assert_eq!(
            status(StatusCode::UNPROCESSABLE_ENTITY).kind(),
            ErrorKind::Validation
        );
        assert_eq!(status(StatusCode::BAD_GATEWAY).kind(), ErrorKind::Server);
    }

    #[test]
    fn test_auth_failures() {
        assert!(ClientError::SessionExpired.is_auth_failure());
        assert!(ClientError::Unauthorized.is_auth_failure());
        assert!(status(StatusCode::UNAUTHORIZED).is_auth_failure());
        assert!(!status(StatusCode::FORBIDDEN).is_auth_failure());
    }

    #[test]
    fn test_validation_display() {
        let err = ClientError::Validation(PatchError::Empty);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid update: patch does not change any field");
    }
}
