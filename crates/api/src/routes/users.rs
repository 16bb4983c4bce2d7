//! User resource handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use shopfront_core::{User, UserId, UserPatch};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// The signed-in user.
///
/// # Route
///
/// `GET /api/users/me`
pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Apply a partial update to a user.
///
/// Callers may update themselves; admins may update anyone. Supplied fields
/// replace the stored ones wholesale.
///
/// # Route
///
/// `PATCH /api/users/{id}`
#[instrument(skip_all, fields(user_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    RequireUser(caller): RequireUser,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>> {
    if caller.id != id && !caller.is_admin() {
        return Err(AppError::Forbidden("cannot update another user".to_string()));
    }

    patch.validate()?;

    let user = state.users().update(&id, patch).await?;
    info!(cart_lines = user.cart.len(), wishlist_lines = user.wishlist.len(), "user updated");

    Ok(Json(user))
}
