//! User repository.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use shopfront_core::{Email, Role, User, UserId, UserPatch};

use super::RepositoryError;

#[derive(Debug, Default)]
struct Records {
    users: HashMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
}

/// Shared handle to the user records.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    records: Arc<RwLock<Records>>,
}

impl UserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user by their ID.
    pub async fn get_by_id(&self, id: &UserId) -> Option<User> {
        self.records.read().await.users.get(id).cloned()
    }

    /// Create a user with empty collections.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    pub async fn create(&self, email: Email, name: &str, role: Role) -> Result<User, RepositoryError> {
        let mut records = self.records.write().await;
        if records.by_email.contains_key(&email) {
            return Err(RepositoryError::Conflict(format!("email {email} already registered")));
        }
        Ok(Self::insert(&mut records, email, name, role))
    }

    /// Return the user registered with `email`, creating it on first sight.
    ///
    /// The boolean is `true` when the account was just created.
    pub async fn find_or_create(&self, email: Email, name: &str, role: Role) -> (User, bool) {
        let mut records = self.records.write().await;
        if let Some(user) = records.by_email.get(&email).and_then(|id| records.users.get(id)) {
            return (user.clone(), false);
        }
        (Self::insert(&mut records, email, name, role), true)
    }

    /// Apply a validated patch and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    pub async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        let mut records = self.records.write().await;
        let user = records.users.get_mut(id).ok_or(RepositoryError::NotFound)?;
        patch.apply_to(user);
        Ok(user.clone())
    }

    fn insert(records: &mut Records, email: Email, name: &str, role: Role) -> User {
        let mut user = User::new(email, name);
        user.role = role;
        records.by_email.insert(user.email.clone(), user.id.clone());
        records.users.insert(user.id.clone(), user.clone());
        user
    }
}
