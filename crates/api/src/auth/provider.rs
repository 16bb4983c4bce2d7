//! Identity providers.
//!
//! The login flow only needs two things from a provider: where to send the
//! browser, and who the returned authorization code belongs to.
//! [`OAuthProvider`] implements both for a generic OAuth 2.0
//! authorization-code provider with a userinfo endpoint.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::AuthError;
use crate::config::OAuthConfig;

/// Who signed in, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A source of authenticated identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to in order to sign in.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange an authorization code for the identity it was issued to.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the code or is unreachable.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth 2.0 authorization-code client over `reqwest`.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    client: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthProvider {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let separator = if self.config.authorize_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Identity, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!("token exchange failed: {text}")));
        }

        let token: TokenResponse = response.json().await?;

        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!("userinfo request failed: {text}")));
        }

        Ok(response.json().await?)
    }
}
