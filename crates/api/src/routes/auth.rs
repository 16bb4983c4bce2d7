//! Login, refresh and logout handlers.
//!
//! - `login` stores a random `state` in the server session and redirects to
//!   the identity provider
//! - `callback` checks the `state` once, resolves the identity, creates the
//!   account on first login and sets both credential cookies
//! - `refresh` trades the refresh cookie for a new access cookie
//! - `logout` revokes both credentials and expires their cookies

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, instrument, warn};

use shopfront_core::{Email, Role, User};

use crate::auth::{AuthError, generate_random_string};
use crate::error::{AppError, Result, clear_sentry_user, report, set_sentry_user};
use crate::middleware::cookies::{
    ACCESS_COOKIE, REFRESH_COOKIE, credential_cookie, expired_cookie, read_cookie,
};
use crate::state::AppState;

/// Session key holding the pending OAuth `state`.
const OAUTH_STATE_KEY: &str = "oauth_state";

/// Length of the OAuth `state` parameter.
const OAUTH_STATE_LENGTH: usize = 32;

/// Query parameters of the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Start a login.
///
/// # Route
///
/// `GET /auth/login`
#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let oauth_state = generate_random_string(OAUTH_STATE_LENGTH);
    session
        .insert(OAUTH_STATE_KEY, &oauth_state)
        .await
        .map_err(AuthError::from)?;

    let url = state
        .provider()
        .authorization_url(&state.config().callback_url(), &oauth_state);

    Ok(Redirect::to(&url))
}

/// Finish a login and hand the browser back to the frontend.
///
/// Every failure lands on the frontend login page with an `error` code
/// instead of an error response. Failures on this side or at the provider
/// are still reported as server errors.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let config = state.config();

    let user = match authenticate(&state, &session, query).await {
        Ok(user) => user,
        Err(e) => {
            let url = config.login_error_url(e.code());
            let err = AppError::from(e);
            if err.is_server_fault() {
                report(&err);
            } else {
                warn!(error = %err, "login failed");
            }
            return Redirect::to(&url).into_response();
        }
    };

    let tokens = state.tokens();
    let pair = tokens.issue(&user.id).await;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    info!(user_id = %user.id, "signed in");

    let secure = config.is_secure();
    let access = credential_cookie(ACCESS_COOKIE, pair.access, tokens.access_ttl(), secure);
    let refresh = credential_cookie(REFRESH_COOKIE, pair.refresh, tokens.refresh_ttl(), secure);

    (
        AppendHeaders([(SET_COOKIE, access.to_string()), (SET_COOKIE, refresh.to_string())]),
        Redirect::to(&config.frontend_url),
    )
        .into_response()
}

/// Validate the callback and resolve it to an account.
async fn authenticate(
    state: &AppState,
    session: &Session,
    query: CallbackQuery,
) -> std::result::Result<User, AuthError> {
    // The stored state is consumed whatever the outcome.
    let stored_state: Option<String> = session.remove(OAUTH_STATE_KEY).await?;

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        return Err(AuthError::Denied(format!("{error} {description}").trim().to_string()));
    }

    match (stored_state, query.state) {
        (Some(expected), Some(returned)) if expected == returned => {}
        _ => return Err(AuthError::StateMismatch),
    }

    let code = query.code.ok_or(AuthError::MissingCode)?;
    let identity = state
        .provider()
        .exchange_code(&code, &state.config().callback_url())
        .await?;

    let email = Email::parse(&identity.email)?;
    let role = if state.config().is_admin_email(&email) {
        Role::Admin
    } else {
        Role::Customer
    };
    let name = identity
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.local_part().to_owned());

    let (user, created) = state.users().find_or_create(email, &name, role).await;
    if created {
        info!(user_id = %user.id, role = ?user.role, "created account");
    }

    Ok(user)
}

/// Renew the access credential.
///
/// # Route
///
/// `POST /auth/refresh`
#[instrument(skip_all)]
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let token = read_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("missing refresh token".to_string()))?;

    let tokens = state.tokens();
    let (user_id, access) = tokens
        .refresh(&token)
        .await
        .ok_or_else(|| AppError::Unauthorized("refresh token expired".to_string()))?;
    debug!(user_id = %user_id, "access token renewed");

    let cookie = credential_cookie(
        ACCESS_COOKIE,
        access,
        tokens.access_ttl(),
        state.config().is_secure(),
    );

    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cookie.to_string())])).into_response())
}

/// End the session.
///
/// Succeeds even without credentials so a stale client can always log out.
///
/// # Route
///
/// `POST /auth/logout`
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let access = read_cookie(&headers, ACCESS_COOKIE);
    let refresh = read_cookie(&headers, REFRESH_COOKIE);

    state
        .tokens()
        .revoke(access.as_deref(), refresh.as_deref())
        .await;
    clear_sentry_user();
    info!("signed out");

    let secure = state.config().is_secure();
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (SET_COOKIE, expired_cookie(ACCESS_COOKIE, secure).to_string()),
            (SET_COOKIE, expired_cookie(REFRESH_COOKIE, secure).to_string()),
        ]),
    )
        .into_response()
}
