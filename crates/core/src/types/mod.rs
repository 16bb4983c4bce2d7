//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod line;
pub mod patch;
pub mod price;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use line::{
    CartLine, CollectionKind, LineItem, ProductSnapshot, Quantity, WishlistLine,
    find_duplicate_product, total_quantity,
};
pub use patch::{PatchError, UserPatch};
pub use price::{CurrencyCode, Price};
pub use user::{Role, User};
