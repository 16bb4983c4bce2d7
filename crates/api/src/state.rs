//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{IdentityProvider, OAuthProvider, TokenStore};
use crate::config::ApiConfig;
use crate::db::UserRepository;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the user records, the credential store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    users: UserRepository,
    tokens: TokenStore,
    provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create application state backed by the configured OAuth provider.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let provider = Arc::new(OAuthProvider::new(config.oauth.clone()));
        Self::with_provider(config, provider)
    }

    /// Create application state with an explicit identity provider.
    #[must_use]
    pub fn with_provider(config: ApiConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        let tokens = TokenStore::new(config.access_token_ttl, config.refresh_token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users: UserRepository::new(),
                tokens,
                provider,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn users(&self) -> &UserRepository {
        &self.inner.users
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.inner.provider.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}
