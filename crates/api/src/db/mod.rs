//! User record storage.
//!
//! Records live in process memory behind a `tokio::sync::RwLock`. Every
//! update replaces whole fields, so concurrent writers resolve as
//! last-write-wins.

pub mod users;

pub use users::UserRepository;

use thiserror::Error;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
