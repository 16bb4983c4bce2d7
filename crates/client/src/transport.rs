//! Request/response plumbing between the client and the api.
//!
//! [`Transport`] is the seam the auth interceptor wraps. The production
//! implementation is [`HttpTransport`] over `reqwest`, with a cookie jar that
//! carries the HTTP-only access and refresh cookies.

use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// An outbound api call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the api base URL, e.g. `/api/users/me`.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Navigate to the login screen if the session cannot be renewed.
    pub redirect_on_expiry: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            redirect_on_expiry: true,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Fail quietly instead of navigating to login when the session is gone.
    #[must_use]
    pub const fn without_login_redirect(mut self) -> Self {
        self.redirect_on_expiry = false;
        self
    }
}

/// A received api response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Turn a non-2xx response into [`ClientError::Status`].
    ///
    /// # Errors
    ///
    /// Returns the status and the response text as the message.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status,
                message: self.body,
            })
        }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends a request and returns whatever the api answered.
///
/// Implementations report transport failures as errors and every HTTP status,
/// including 401, as a response.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send;
}

/// `reqwest`-backed transport with a persistent cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Create a transport with a fresh cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_cookie_jar(config, Arc::new(Jar::default()))
    }

    /// Create a transport sharing an existing cookie jar, e.g. one populated
    /// by a login flow driven elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_cookie_jar(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_provider(jar.clone())
            .user_agent(concat!("shopfront-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(config.api_base_url.clone()),
            jar,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Resolve a request path below the base URL, keeping any path prefix
    /// the api is mounted under.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint(&request.path)?;

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde::Deserialize;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::patch("/api/users/1")
            .json(&serde_json::json!({"cart": []}))
            .unwrap()
            .without_login_redirect();

        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.body.unwrap()["cart"], serde_json::json!([]));
        assert!(!request.redirect_on_expiry);
        assert!(ApiRequest::get("/").redirect_on_expiry);
    }

    #[test]
    fn test_error_for_status() {
        assert!(ApiResponse::new(StatusCode::NO_CONTENT, "").error_for_status().is_ok());

        let err = ApiResponse::new(StatusCode::NOT_FOUND, "Not found: user")
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.to_string(), "request failed (404 Not Found): Not found: user");
    }

    #[test]
    fn test_json_body() {
        #[derive(Deserialize)]
        struct Body {
            ok: bool,
        }

        let response = ApiResponse::new(StatusCode::OK, r#"{"ok":true}"#);
        assert!(response.json::<Body>().unwrap().ok);
        assert!(ApiResponse::new(StatusCode::OK, "nope").json::<Body>().is_err());
    }

    #[test]
    fn test_http_transport_builds() {
        let config = ClientConfig::new("http://127.0.0.1:4000".parse().unwrap());
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url().as_str(), "http://127.0.0.1:4000/");
        assert_eq!(
            transport.endpoint("/api/users/me").unwrap().as_str(),
            "http://127.0.0.1:4000/api/users/me"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        for base in ["https://shop.example.com/backend", "https://shop.example.com/backend/"] {
            let config = ClientConfig::new(base.parse().unwrap());
            let transport = HttpTransport::new(&config).unwrap();

            assert_eq!(
                transport.endpoint("/api/users/me").unwrap().as_str(),
                "https://shop.example.com/backend/api/users/me"
            );
            assert_eq!(
                transport.endpoint("/auth/refresh").unwrap().as_str(),
                "https://shop.example.com/backend/auth/refresh"
            );
        }
    }

    #[tokio::test]
    async fn test_unresponsive_api_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = ClientConfig::new(format!("http://{addr}").parse().unwrap());
        config.timeout = Duration::from_millis(100);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .send(&ApiRequest::get("/api/users/me"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);

        server.abort();
    }
}
