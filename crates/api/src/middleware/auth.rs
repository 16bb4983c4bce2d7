//! Authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};

use shopfront_core::User;

use super::cookies::{ACCESS_COOKIE, read_cookie};
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a live access credential.
///
/// Rejects with `401` when the `access_token` cookie is missing, expired or
/// revoked, which is the signal clients use to attempt a refresh.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireUser(user): RequireUser) -> Json<User> {
///     Json(user)
/// }
/// ```
#[derive(Debug)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, ACCESS_COOKIE)
            .ok_or_else(|| AppError::Unauthorized("missing access token".to_string()))?;

        let user_id = state
            .tokens()
            .user_for_access(&token)
            .await
            .ok_or_else(|| AppError::Unauthorized("access token expired".to_string()))?;

        let user = state
            .users()
            .get_by_id(&user_id)
            .await
            .ok_or_else(|| AppError::Unauthorized("unknown account".to_string()))?;

        Ok(Self(user))
    }
}
