//! Shopfront Core - Shared types and reconciliation logic.
//!
//! This crate provides the types used by every Shopfront component:
//! - `api` - Auth and account service
//! - `client` - Guest storage, session context and HTTP client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, prices, line items, the user entity and its patch schema
//! - [`merge`] - Guest-to-account cart and wishlist merge

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod merge;
pub mod types;

pub use merge::{MergeStrategy, merge_cart, merge_lines, merge_wishlist};
pub use types::*;
