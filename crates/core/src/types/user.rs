//! The account entity shared by the api and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartLine, CollectionKind, Email, LineItem, UserId, WishlistLine};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// A storefront account with its server-authoritative cart and wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub wishlist: Vec<WishlistLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a customer account with empty collections.
    #[must_use]
    pub fn new(email: Email, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            email,
            name: name.into(),
            role: Role::Customer,
            cart: Vec::new(),
            wishlist: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account may act on other accounts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Lines of the given collection.
    #[must_use]
    pub fn collection(&self, kind: CollectionKind) -> &[LineItem] {
        match kind {
            CollectionKind::Cart => &self.cart,
            CollectionKind::Wishlist => &self.wishlist,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Quantity;

    #[test]
    fn test_new_user_has_empty_collections() {
        let user = User::new(Email::parse("a@example.com").unwrap(), "A");
        assert!(user.cart.is_empty());
        assert!(user.wishlist.is_empty());
        assert_eq!(user.role, Role::Customer);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_collection_selects_field() {
        let mut user = User::new(Email::parse("a@example.com").unwrap(), "A");
        user.wishlist.push(LineItem::new("W", Quantity::ONE));
        assert!(user.collection(CollectionKind::Cart).is_empty());
        assert_eq!(user.collection(CollectionKind::Wishlist).len(), 1);
    }

    #[test]
    fn test_missing_collections_deserialize_empty() {
        let json = serde_json::json!({
            "id": "u1",
            "email": "a@example.com",
            "name": "A",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.cart.is_empty());
        assert_eq!(user.role, Role::Customer);
    }
}
