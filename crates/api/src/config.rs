//! Api configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_BASE_URL` - Public URL of this api (OAuth callback and cookie `Secure` flag)
//! - `FRONTEND_URL` - Where the browser is sent after login
//! - `OAUTH_AUTHORIZE_URL` - Identity provider authorization endpoint
//! - `OAUTH_TOKEN_URL` - Identity provider token endpoint
//! - `OAUTH_USERINFO_URL` - Identity provider userinfo endpoint
//! - `OAUTH_CLIENT_ID` - OAuth client ID
//! - `OAUTH_CLIENT_SECRET` - OAuth client secret (high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 4000)
//! - `ACCESS_TOKEN_TTL_SECS` - Access credential lifetime (default: 900)
//! - `REFRESH_TOKEN_TTL_SECS` - Refresh credential lifetime (default: 604800)
//! - `ADMIN_EMAILS` - Comma-separated emails granted the admin role on sign-up
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use shopfront_core::Email;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Api configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the api, without trailing slash
    pub base_url: String,
    /// Frontend origin the browser returns to after login
    pub frontend_url: String,
    /// Lifetime of the access credential
    pub access_token_ttl: Duration,
    /// Lifetime of the refresh credential
    pub refresh_token_ttl: Duration,
    /// Identity provider settings
    pub oauth: OAuthConfig,
    /// Accounts created with one of these emails get the admin role
    pub admin_emails: Vec<Email>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// OAuth 2.0 identity provider configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct OAuthConfig {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Default access credential lifetime (15 minutes).
    pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
    /// Default refresh credential lifetime (7 days).
    pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the client secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let access_token_ttl = get_duration_secs("ACCESS_TOKEN_TTL_SECS", Self::DEFAULT_ACCESS_TTL)?;
        let refresh_token_ttl =
            get_duration_secs("REFRESH_TOKEN_TTL_SECS", Self::DEFAULT_REFRESH_TTL)?;

        Ok(Self {
            host,
            port,
            base_url: get_url("API_BASE_URL")?,
            frontend_url: get_url("FRONTEND_URL")?,
            access_token_ttl,
            refresh_token_ttl,
            oauth: OAuthConfig::from_env()?,
            admin_emails: parse_admin_emails(&get_env_or_default("ADMIN_EMAILS", ""))?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Redirect URI registered with the identity provider.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }

    /// Frontend login page carrying an error code.
    #[must_use]
    pub fn login_error_url(&self, code: &str) -> String {
        format!("{}/login?error={}", self.frontend_url, urlencoding::encode(code))
    }

    /// Whether a new account with this email starts as an admin.
    #[must_use]
    pub fn is_admin_email(&self, email: &Email) -> bool {
        self.admin_emails.contains(email)
    }
}

impl OAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            authorize_url: get_url("OAUTH_AUTHORIZE_URL")?,
            token_url: get_url("OAUTH_TOKEN_URL")?,
            userinfo_url: get_url("OAUTH_USERINFO_URL")?,
            client_id: get_required_env("OAUTH_CLIENT_ID")?,
            client_secret: get_validated_secret("OAUTH_CLIENT_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required absolute URL, normalized without a trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Get a duration in whole seconds, falling back to `default`.
fn get_duration_secs(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Parse a comma-separated list of emails, ignoring blanks.
fn parse_admin_emails(raw: &str) -> Result<Vec<Email>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Email::parse(s)
                .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_EMAILS".to_string(), e.to_string()))
        })
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            base_url: base_url.to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            access_token_ttl: ApiConfig::DEFAULT_ACCESS_TTL,
            refresh_token_ttl: ApiConfig::DEFAULT_REFRESH_TTL,
            oauth: OAuthConfig {
                authorize_url: "https://id.test/authorize".to_string(),
                token_url: "https://id.test/token".to_string(),
                userinfo_url: "https://id.test/userinfo".to_string(),
                client_id: "client_id_value".to_string(),
                client_secret: SecretString::from("super_secret_client_secret"),
            },
            admin_emails: vec![Email::parse("boss@shop.test").unwrap()],
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(matches!(
            validate_secret_strength("your-client-secret", "TEST_VAR"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
        assert!(validate_secret_strength(&"a".repeat(40), "TEST_VAR").is_err());
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_admin_emails() {
        let emails = parse_admin_emails(" Boss@Shop.test, ,ops@shop.test").unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].as_str(), "boss@shop.test");
        assert!(parse_admin_emails("").unwrap().is_empty());
        assert!(parse_admin_emails("not-an-email").is_err());
    }

    #[test]
    fn test_derived_urls() {
        let cfg = config("http://localhost:4000");
        assert_eq!(cfg.socket_addr().port(), 4000);
        assert_eq!(cfg.callback_url(), "http://localhost:4000/auth/callback");
        assert_eq!(
            cfg.login_error_url("invalid state"),
            "http://localhost:3000/login?error=invalid%20state"
        );
        assert!(!cfg.is_secure());
        assert!(config("https://api.shop.test").is_secure());
    }

    #[test]
    fn test_admin_email() {
        let config = config("http://localhost:4000");
        assert!(config.is_admin_email(&Email::parse("BOSS@shop.test").unwrap()));
        assert!(!config.is_admin_email(&Email::parse("shopper@shop.test").unwrap()));
    }

    #[test]
    fn test_oauth_config_debug_redacts_secret() {
        let debug_output = format!("{:?}", config("http://localhost:4000").oauth);

        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
    }
}
