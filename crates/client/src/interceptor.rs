//! Transparent renewal of an expired access credential.
//!
//! Every api call goes through [`AuthRefresh::execute`]. When the api answers
//! 401, the interceptor exchanges the refresh cookie once at
//! [`REFRESH_PATH`] and reissues the original request a single time:
//!
//! ```text
//! send ──non-401──▶ return response
//!   │
//!   401, not retried ──▶ mark retried, POST /auth/refresh
//!   │                         ├─ ok ────▶ send again (outcome returned as-is)
//!   │                         └─ fails ─▶ navigate to /login, SessionExpired
//!   401, retried ──▶ Unauthorized
//! ```
//!
//! The `retried` flag on the request context is what stops a persistently
//! invalid session from looping through refresh forever.

use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Refresh endpoint exchanged on 401.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Client-side route shown when the session cannot be renewed.
pub const LOGIN_ROUTE: &str = "/login";

/// Client-side navigation, e.g. a router push in a UI host.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route);
    }
}

/// Per-request state carried through the retry cycle.
#[derive(Debug)]
struct RequestContext {
    request: ApiRequest,
    retried: bool,
}

/// Wraps a [`Transport`] with the single refresh-and-retry rule.
#[derive(Debug, Clone)]
pub struct AuthRefresh<T, N> {
    transport: T,
    navigator: N,
}

impl<T: Transport, N: Navigator> AuthRefresh<T, N> {
    pub const fn new(transport: T, navigator: N) -> Self {
        Self {
            transport,
            navigator,
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, renewing the session once on 401.
    ///
    /// Non-401 responses, including other error statuses, are returned
    /// unchanged for the caller to interpret.
    ///
    /// # Errors
    ///
    /// - [`ClientError::SessionExpired`] if the refresh exchange fails
    /// - [`ClientError::Unauthorized`] if the retried request is still 401
    /// - transport errors from either send
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut context = RequestContext {
            request,
            retried: false,
        };

        loop {
            let response = self.transport.send(&context.request).await?;
            if response.status != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if context.retried {
                warn!("still unauthorized after session refresh");
                return Err(ClientError::Unauthorized);
            }
            context.retried = true;

            if let Err(e) = self.refresh().await {
                warn!(error = %e, "session refresh failed");
                if context.request.redirect_on_expiry {
                    self.navigator.navigate(LOGIN_ROUTE);
                }
                return Err(ClientError::SessionExpired);
            }
            debug!("session refreshed, retrying request");
        }
    }

    /// Exchange the refresh credential for a new access credential.
    async fn refresh(&self) -> Result<(), ClientError> {
        self.transport
            .send(&ApiRequest::post(REFRESH_PATH))
            .await?
            .error_for_status()
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{RecordingNavigator, ScriptedTransport};

    fn ok(body: &str) -> ApiResponse {
        ApiResponse::new(StatusCode::OK, body)
    }

    fn unauthorized() -> ApiResponse {
        ApiResponse::new(StatusCode::UNAUTHORIZED, "Unauthorized: missing access token")
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let transport = ScriptedTransport::new(vec![ok("first")]);
        let navigator = RecordingNavigator::default();
        let client = AuthRefresh::new(transport.clone(), navigator.clone());

        let response = client.execute(ApiRequest::get("/api/users/me")).await.unwrap();

        assert_eq!(response.body, "first");
        assert_eq!(transport.paths(), vec!["/api/users/me"]);
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_other_error_statuses_are_not_retried() {
        let transport = ScriptedTransport::new(vec![ApiResponse::new(StatusCode::FORBIDDEN, "no")]);
        let client = AuthRefresh::new(transport.clone(), RecordingNavigator::default());

        let response = client.execute(ApiRequest::get("/api/users/me")).await.unwrap();

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(transport.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_success_retries_exactly_once() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            ApiResponse::new(StatusCode::NO_CONTENT, ""),
            ok("second"),
        ]);
        let navigator = RecordingNavigator::default();
        let client = AuthRefresh::new(transport.clone(), navigator.clone());

        let response = client.execute(ApiRequest::get("/api/users/me")).await.unwrap();

        assert_eq!(response.body, "second");
        assert_eq!(
            transport.paths(),
            vec!["/api/users/me", REFRESH_PATH, "/api/users/me"]
        );
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_retried_outcome_is_returned_as_is() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            ApiResponse::new(StatusCode::NO_CONTENT, ""),
            ApiResponse::new(StatusCode::UNPROCESSABLE_ENTITY, "bad patch"),
        ]);
        let client = AuthRefresh::new(transport.clone(), RecordingNavigator::default());

        let response = client.execute(ApiRequest::patch("/api/users/u1")).await.unwrap();

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(transport.paths().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_failure_navigates_to_login_without_retry() {
        let transport = ScriptedTransport::new(vec![unauthorized(), unauthorized()]);
        let navigator = RecordingNavigator::default();
        let client = AuthRefresh::new(transport.clone(), navigator.clone());

        let err = client
            .execute(ApiRequest::get("/api/users/me"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SessionExpired));
        assert_eq!(transport.paths(), vec!["/api/users/me", REFRESH_PATH]);
        assert_eq!(navigator.routes(), vec![LOGIN_ROUTE]);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_rejected_without_second_refresh() {
        let transport = ScriptedTransport::new(vec![
            unauthorized(),
            ApiResponse::new(StatusCode::NO_CONTENT, ""),
            unauthorized(),
        ]);
        let navigator = RecordingNavigator::default();
        let client = AuthRefresh::new(transport.clone(), navigator.clone());

        let err = client
            .execute(ApiRequest::get("/api/users/me"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(
            transport.paths(),
            vec!["/api/users/me", REFRESH_PATH, "/api/users/me"]
        );
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_silent_request_does_not_navigate() {
        let transport = ScriptedTransport::new(vec![unauthorized(), unauthorized()]);
        let navigator = RecordingNavigator::default();
        let client = AuthRefresh::new(transport, navigator.clone());

        let err = client
            .execute(ApiRequest::get("/api/users/me").without_login_redirect())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SessionExpired));
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_closure_navigator() {
        let transport = ScriptedTransport::new(vec![unauthorized(), unauthorized()]);
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        let client = AuthRefresh::new(transport, move |route: &str| {
            assert_eq!(route, LOGIN_ROUTE);
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        let _ = client.execute(ApiRequest::get("/api/users/me")).await;
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
