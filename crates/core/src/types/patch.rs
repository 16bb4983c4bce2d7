//! Partial-update payload for a user record.
//!
//! The api accepts a sparse set of fields to change. Every payload is a
//! closed schema: unknown fields are rejected at deserialization and the
//! field values are checked by [`UserPatch::validate`] on both sides of the
//! wire.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CartLine, CollectionKind, ProductId, User, WishlistLine, find_duplicate_product};

/// Validation failures for a [`UserPatch`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// No field was set.
    #[error("patch does not change any field")]
    Empty,

    /// The display name is blank.
    #[error("name cannot be blank")]
    BlankName,

    /// The display name is too long.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },

    /// A product appears twice in one collection.
    #[error("product {product_id} appears more than once in {collection}")]
    DuplicateProduct {
        collection: CollectionKind,
        product_id: ProductId,
    },
}

/// Sparse update of a user record. `None` fields are left untouched; a
/// supplied collection replaces the stored one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<Vec<CartLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<Vec<WishlistLine>>,
}

impl UserPatch {
    /// Maximum display name length in characters.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Patch replacing the cart.
    #[must_use]
    pub fn cart(lines: Vec<CartLine>) -> Self {
        Self {
            cart: Some(lines),
            ..Self::default()
        }
    }

    /// Patch replacing the wishlist.
    #[must_use]
    pub fn wishlist(lines: Vec<WishlistLine>) -> Self {
        Self {
            wishlist: Some(lines),
            ..Self::default()
        }
    }

    /// Patch replacing one collection.
    #[must_use]
    pub fn collection(kind: CollectionKind, lines: Vec<CartLine>) -> Self {
        match kind {
            CollectionKind::Cart => Self::cart(lines),
            CollectionKind::Wishlist => Self::wishlist(lines),
        }
    }

    /// Check the patch against the user schema.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), PatchError> {
        if self.name.is_none() && self.cart.is_none() && self.wishlist.is_none() {
            return Err(PatchError::Empty);
        }

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(PatchError::BlankName);
            }
            if name.chars().count() > Self::MAX_NAME_LENGTH {
                return Err(PatchError::NameTooLong {
                    max: Self::MAX_NAME_LENGTH,
                });
            }
        }

        for (kind, lines) in [
            (CollectionKind::Cart, &self.cart),
            (CollectionKind::Wishlist, &self.wishlist),
        ] {
            if let Some(duplicate) = lines.as_deref().and_then(find_duplicate_product) {
                return Err(PatchError::DuplicateProduct {
                    collection: kind,
                    product_id: duplicate.clone(),
                });
            }
        }

        Ok(())
    }

    /// Apply the patch to a user, replacing every supplied field.
    ///
    /// Callers validate first; this does not re-check.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name.trim().to_owned();
        }
        if let Some(cart) = self.cart {
            user.cart = cart;
        }
        if let Some(wishlist) = self.wishlist {
            user.wishlist = wishlist;
        }
        user.updated_at = Utc::now();
    }
}
