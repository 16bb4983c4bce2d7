//! End-to-end test harness for Shopfront.
//!
//! [`TestServer`] binds the api router on an ephemeral port with a stub
//! identity provider, so the login flow, the credential cookies and the
//! client's refresh handling run over real HTTP without external services.
//!
//! ```rust,ignore
//! let server = TestServer::spawn().await;
//! let jar = Arc::new(Jar::default());
//! let navigator = RecordingNavigator::default();
//! let mut session = server.shop_session(jar.clone(), navigator.clone());
//!
//! server.login(&jar, "shopper@shop.test").await;
//! session.complete_login().await?;
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{StatusCode, header, redirect::Policy};
use secrecy::SecretString;
use tokio::net::TcpListener;
use url::Url;

use shopfront_api::auth::{AuthError, Identity, IdentityProvider};
use shopfront_api::config::OAuthConfig;
use shopfront_api::{ApiConfig, AppState};
use shopfront_client::{
    AccountApi, AuthRefresh, ClientConfig, HttpTransport, MemoryStorage, Navigator, ShopSession,
};

/// Frontend origin the api redirects to after login.
pub const FRONTEND_URL: &str = "http://frontend.test";

/// Identity provider that vouches for whatever email is passed as the code.
#[derive(Debug, Clone, Copy)]
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let mut url = Url::parse("https://id.test/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        url.into()
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<Identity, AuthError> {
        Ok(Identity {
            email: code.to_string(),
            name: None,
        })
    }
}

/// Navigator that records every route it is sent to.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

/// A running api bound to `127.0.0.1` on an ephemeral port.
pub struct TestServer {
    pub base_url: Url,
    pub state: AppState,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start a server after adjusting its configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut ApiConfig)) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = test_config(addr);
        configure(&mut config);

        let state = AppState::with_provider(config, Arc::new(StubProvider));
        let app = shopfront_api::app(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
            handle,
        }
    }

    /// Run the browser side of the login flow, leaving the credential
    /// cookies in `jar`.
    pub async fn login(&self, jar: &Arc<Jar>, email: &str) {
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .build()
            .unwrap();

        let response = client
            .get(self.base_url.join("/auth/login").unwrap())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let authorize = Url::parse(location(&response)).unwrap();
        let (_, oauth_state) = authorize
            .query_pairs()
            .find(|(key, _)| key == "state")
            .unwrap();

        let mut callback = self.base_url.join("/auth/callback").unwrap();
        callback
            .query_pairs_mut()
            .append_pair("code", email)
            .append_pair("state", &oauth_state);

        let response = client.get(callback).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), FRONTEND_URL);
    }

    /// A signed-out client session sharing `jar` with the browser.
    #[must_use]
    pub fn shop_session<N: Navigator>(&self, jar: Arc<Jar>, navigator: N) -> ShopSession<HttpTransport, N> {
        let config = ClientConfig::new(self.base_url.clone());
        let transport = HttpTransport::with_cookie_jar(&config, jar).unwrap();
        ShopSession::new(
            AccountApi::new(AuthRefresh::new(transport, navigator)),
            Arc::new(MemoryStorage::new()),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap()
}

fn test_config(addr: SocketAddr) -> ApiConfig {
    ApiConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        frontend_url: FRONTEND_URL.to_string(),
        access_token_ttl: ApiConfig::DEFAULT_ACCESS_TTL,
        refresh_token_ttl: ApiConfig::DEFAULT_REFRESH_TTL,
        oauth: OAuthConfig {
            authorize_url: "https://id.test/authorize".to_string(),
            token_url: "https://id.test/token".to_string(),
            userinfo_url: "https://id.test/userinfo".to_string(),
            client_id: "shopfront-tests".to_string(),
            client_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
        },
        admin_emails: Vec::new(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}
