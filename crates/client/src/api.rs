//! Account endpoints of the Shopfront api.

use tracing::instrument;

use shopfront_core::{User, UserId, UserPatch};

use crate::error::ClientError;
use crate::interceptor::{AuthRefresh, Navigator};
use crate::transport::{ApiRequest, Transport};

/// Path of the authenticated user resource.
pub const CURRENT_USER_PATH: &str = "/api/users/me";

/// Path that invalidates both session credentials.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Typed access to the account endpoints, every call going through the
/// auth-refresh interceptor.
#[derive(Debug, Clone)]
pub struct AccountApi<T, N> {
    client: AuthRefresh<T, N>,
}

impl<T: Transport, N: Navigator> AccountApi<T, N> {
    pub const fn new(client: AuthRefresh<T, N>) -> Self {
        Self { client }
    }

    pub const fn client(&self) -> &AuthRefresh<T, N> {
        &self.client
    }

    /// Fetch the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session cannot be renewed.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.fetch_user(ApiRequest::get(CURRENT_USER_PATH)).await
    }

    /// Fetch the signed-in user without navigating to login when there is no
    /// usable session.
    ///
    /// # Errors
    ///
    /// Same as [`Self::current_user`].
    pub async fn current_user_silent(&self) -> Result<User, ClientError> {
        self.fetch_user(ApiRequest::get(CURRENT_USER_PATH).without_login_redirect())
            .await
    }

    /// Apply a partial update to a user and return the updated record.
    ///
    /// The patch is validated before anything is sent. A supplied collection
    /// replaces the stored one wholesale; concurrent writers overwrite each
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an invalid patch, otherwise
    /// any request or status error.
    #[instrument(skip(self, patch), fields(user_id = %user_id))]
    pub async fn update_user(&self, user_id: &UserId, patch: &UserPatch) -> Result<User, ClientError> {
        patch.validate()?;

        let path = format!("/api/users/{}", urlencoding::encode(user_id.as_str()));
        let request = ApiRequest::patch(path).json(patch)?;
        self.fetch_user(request).await
    }

    /// Invalidate the session on the api.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.client
            .execute(ApiRequest::post(LOGOUT_PATH).without_login_redirect())
            .await?
            .error_for_status()
            .map(|_| ())
    }

    async fn fetch_user(&self, request: ApiRequest) -> Result<User, ClientError> {
        self.client
            .execute(request)
            .await?
            .error_for_status()?
            .json()
    }
}
