//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Origin of the Shopfront api (e.g., `https://shop.example.com`)
//!
//! ## Optional
//! - `SHOPFRONT_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPFRONT_STORAGE_DIR` - Directory for the guest cart/wishlist files;
//!   guest state is kept in memory when unset

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::storage::{FileStorage, MemoryStorage, Storage, StorageError};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopfront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the request paths are resolved against.
    pub api_base_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Where guest collections are persisted, if anywhere.
    pub storage_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Configuration with defaults for everything but the api origin.
    #[must_use]
    pub const fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            storage_dir: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPFRONT_API_URL` is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_base_url = std::env::var("SHOPFRONT_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SHOPFRONT_API_URL".to_string()))?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string()))?;

        let timeout = match std::env::var("SHOPFRONT_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            Err(_) => Self::DEFAULT_TIMEOUT,
        };

        let storage_dir = std::env::var_os("SHOPFRONT_STORAGE_DIR").map(PathBuf::from);

        Ok(Self {
            api_base_url,
            timeout,
            storage_dir,
        })
    }

    /// Open the storage backend this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn open_storage(&self) -> Result<Arc<dyn Storage>, StorageError> {
        let storage: Arc<dyn Storage> = match &self.storage_dir {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}
