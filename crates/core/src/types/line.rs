//! Cart and wishlist line items.
//!
//! Carts and wishlists share one line shape: a product reference, a
//! quantity and an optional display snapshot of the product. In a wishlist
//! the quantity is conventionally 1 and only presence matters.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A line quantity, always at least 1.
///
/// Zero cannot be represented, so a stored or submitted line with a zero or
/// negative quantity fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, clamping at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display data captured when a product is added, so the collection can be
/// rendered without fetching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product title.
    pub title: String,
    /// URL handle (slug) of the product page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Unit price at the time the product was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductSnapshot {
    /// Snapshot carrying only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            handle: None,
            price: None,
            image: None,
        }
    }
}

/// One product entry in a cart or wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product this line refers to; unique within a collection.
    pub product_id: ProductId,
    /// Number of units. Defaults to 1 when absent (wishlist entries).
    #[serde(default)]
    pub quantity: Quantity,
    /// Optional display snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
}

/// A cart line: quantity is a count.
pub type CartLine = LineItem;

/// A wishlist line: presence marker, quantity conventionally 1.
pub type WishlistLine = LineItem;

impl LineItem {
    /// Create a line without a snapshot.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            product: None,
        }
    }

    /// Attach a product snapshot.
    #[must_use]
    pub fn with_product(mut self, product: ProductSnapshot) -> Self {
        self.product = Some(product);
        self
    }

    /// Line total, when the snapshot carries a price.
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.product
            .as_ref()
            .and_then(|p| p.price)
            .map(|price| price.times(self.quantity.get()))
    }
}

/// The two per-account collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Cart,
    Wishlist,
}

impl CollectionKind {
    /// Field name of the collection on the user record.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Return the first `product_id` that appears more than once, if any.
#[must_use]
pub fn find_duplicate_product(lines: &[LineItem]) -> Option<&ProductId> {
    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| &line.product_id)
        .find(|id| !seen.insert(*id))
}

/// Total number of units across all lines.
#[must_use]
pub fn total_quantity(lines: &[LineItem]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity.get())).sum()
}
