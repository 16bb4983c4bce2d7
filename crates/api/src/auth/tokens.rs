//! Access and refresh credentials.
//!
//! Both are opaque random strings mapped to a user ID in a `moka` cache
//! whose time-to-live is the credential lifetime. An expired entry is never
//! returned, so expiry needs no separate bookkeeping.

use std::time::Duration;

use moka::future::Cache;

use shopfront_core::UserId;

use super::generate_random_string;

/// Length of a generated credential.
const TOKEN_LENGTH: usize = 48;

/// Upper bound on live credentials of each kind.
const MAX_TOKENS: u64 = 100_000;

/// A freshly issued credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues, resolves and revokes session credentials.
#[derive(Clone)]
pub struct TokenStore {
    access: Cache<String, UserId>,
    refresh: Cache<String, UserId>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenStore {
    #[must_use]
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            access: Cache::builder()
                .max_capacity(MAX_TOKENS)
                .time_to_live(access_ttl)
                .build(),
            refresh: Cache::builder()
                .max_capacity(MAX_TOKENS)
                .time_to_live(refresh_ttl)
                .build(),
            access_ttl,
            refresh_ttl,
        }
    }

    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a new access and refresh credential for a user.
    pub async fn issue(&self, user_id: &UserId) -> TokenPair {
        TokenPair {
            access: self.issue_access(user_id).await,
            refresh: self.issue_refresh(user_id).await,
        }
    }

    /// Resolve a live access credential.
    pub async fn user_for_access(&self, token: &str) -> Option<UserId> {
        self.access.get(token).await
    }

    /// Exchange a live refresh credential for a new access credential.
    ///
    /// The refresh credential itself stays valid until it expires or is
    /// revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Option<(UserId, String)> {
        let user_id = self.refresh.get(refresh_token).await?;
        let access = self.issue_access(&user_id).await;
        Some((user_id, access))
    }

    /// Invalidate whichever credentials are given.
    pub async fn revoke(&self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(token) = access {
            self.access.invalidate(token).await;
        }
        if let Some(token) = refresh {
            self.refresh.invalidate(token).await;
        }
    }

    async fn issue_access(&self, user_id: &UserId) -> String {
        let token = generate_random_string(TOKEN_LENGTH);
        self.access.insert(token.clone(), user_id.clone()).await;
        token
    }

    async fn issue_refresh(&self, user_id: &UserId) -> String {
        let token = generate_random_string(TOKEN_LENGTH);
        self.refresh.insert(token.clone(), user_id.clone()).await;
        token
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> TokenStore {
        TokenStore::new(Duration::from_secs(900), Duration::from_secs(604_800))
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let tokens = store();
        let user = UserId::new("u1");
        let pair = tokens.issue(&user).await;

        assert_eq!(pair.access.len(), TOKEN_LENGTH);
        assert_ne!(pair.access, pair.refresh);
        assert_eq!(tokens.user_for_access(&pair.access).await, Some(user));
        // Refresh credentials are not access credentials.
        assert!(tokens.user_for_access(&pair.refresh).await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access() {
        let tokens = store();
        let user = UserId::new("u1");
        let pair = tokens.issue(&user).await;

        let (refreshed_user, access) = tokens.refresh(&pair.refresh).await.unwrap();
        assert_eq!(refreshed_user, user);
        assert_ne!(access, pair.access);
        assert_eq!(tokens.user_for_access(&access).await, Some(user));
        assert!(tokens.refresh("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let tokens = store();
        let pair = tokens.issue(&UserId::new("u1")).await;

        tokens.revoke(Some(&pair.access), Some(&pair.refresh)).await;

        assert!(tokens.user_for_access(&pair.access).await.is_none());
        assert!(tokens.refresh(&pair.refresh).await.is_none());
    }

    #[tokio::test]
    async fn test_access_expires() {
        let tokens = TokenStore::new(Duration::from_millis(50), Duration::from_secs(60));
        let pair = tokens.issue(&UserId::new("u1")).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(tokens.user_for_access(&pair.access).await.is_none());
        assert!(tokens.refresh(&pair.refresh).await.is_some());
    }
}
