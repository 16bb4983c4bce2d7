//! Guest-to-account reconciliation of carts and wishlists.
//!
//! When a guest signs in, the lines collected in local storage are folded
//! into the account's collections. Lines are keyed by `product_id`; the
//! account side is iterated first, so its ordering wins and guest-only
//! products are appended after it.
//!
//! ```
//! use shopfront_core::{LineItem, Quantity, merge_cart};
//!
//! let guest = vec![LineItem::new("A", Quantity::new(2).unwrap())];
//! let account = vec![
//!     LineItem::new("A", Quantity::ONE),
//!     LineItem::new("B", Quantity::new(3).unwrap()),
//! ];
//!
//! let merged = merge_cart(account, guest);
//! assert_eq!(merged[0].quantity.get(), 3);
//! assert_eq!(merged[1].product_id.as_str(), "B");
//! ```

use std::collections::HashMap;

use crate::types::{CartLine, CollectionKind, LineItem, ProductId, WishlistLine};

/// How lines sharing a `product_id` are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Add quantities together (carts).
    SumQuantities,
    /// Keep the first occurrence; later ones only mark presence (wishlists).
    KeepFirst,
}

impl CollectionKind {
    /// The strategy used when reconciling this collection.
    #[must_use]
    pub const fn merge_strategy(self) -> MergeStrategy {
        match self {
            Self::Cart => MergeStrategy::SumQuantities,
            Self::Wishlist => MergeStrategy::KeepFirst,
        }
    }
}

/// Merge two line sequences into one with unique `product_id`s.
///
/// `account` is iterated before `guest`. Duplicates inside a single input
/// are folded with the same rule as duplicates across inputs. The surviving
/// line keeps its own product snapshot; when it has none, the snapshot of
/// the folded line is adopted.
#[must_use]
pub fn merge_lines(
    account: impl IntoIterator<Item = LineItem>,
    guest: impl IntoIterator<Item = LineItem>,
    strategy: MergeStrategy,
) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::new();
    let mut index: HashMap<ProductId, usize> = HashMap::new();

    for line in account.into_iter().chain(guest) {
        let existing = index
            .get(&line.product_id)
            .copied()
            .and_then(|position| merged.get_mut(position));

        match existing {
            Some(kept) => {
                if strategy == MergeStrategy::SumQuantities {
                    kept.quantity = kept.quantity.saturating_add(line.quantity);
                }
                if kept.product.is_none() {
                    kept.product = line.product;
                }
            }
            None => {
                index.insert(line.product_id.clone(), merged.len());
                merged.push(line);
            }
        }
    }

    merged
}

/// Merge carts, summing quantities of shared products.
#[must_use]
pub fn merge_cart(account: Vec<CartLine>, guest: Vec<CartLine>) -> Vec<CartLine> {
    merge_lines(account, guest, MergeStrategy::SumQuantities)
}

/// Merge wishlists, keeping a single entry per product.
#[must_use]
pub fn merge_wishlist(account: Vec<WishlistLine>, guest: Vec<WishlistLine>) -> Vec<WishlistLine> {
    merge_lines(account, guest, MergeStrategy::KeepFirst)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::{ProductSnapshot, Quantity};

    fn line(id: &str, quantity: u32) -> LineItem {
        LineItem::new(id, Quantity::new(quantity).unwrap())
    }

    fn pairs(lines: &[LineItem]) -> Vec<(&str, u32)> {
        lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity.get()))
            .collect()
    }

    #[test]
    fn test_cart_scenario_sums_shared_product() {
        let guest = vec![line("A", 2)];
        let account = vec![line("A", 1), line("B", 3)];

        let merged = merge_cart(account, guest);
        assert_eq!(pairs(&merged), vec![("A", 3), ("B", 3)]);
    }

    #[test]
    fn test_wishlist_scenario_deduplicates() {
        let guest = vec![line("X", 1)];
        let account = vec![line("X", 1), line("Y", 1)];

        let merged = merge_wishlist(account, guest);
        assert_eq!(merged.len(), 2);
        assert_eq!(pairs(&merged), vec![("X", 1), ("Y", 1)]);
    }

    #[test]
    fn test_disjoint_carts_union_and_preserve_totals() {
        let cases: Vec<(Vec<LineItem>, Vec<LineItem>)> = vec![
            (vec![], vec![]),
            (vec![line("A", 1)], vec![]),
            (vec![], vec![line("A", 4), line("B", 2)]),
            (vec![line("A", 2), line("C", 7)], vec![line("B", 5), line("D", 1)]),
        ];

        for (account, guest) in cases {
            let expected_ids: HashSet<String> = account
                .iter()
                .chain(&guest)
                .map(|l| l.product_id.to_string())
                .collect();
            let expected: HashMap<String, u32> = account
                .iter()
                .chain(&guest)
                .map(|l| (l.product_id.to_string(), l.quantity.get()))
                .collect();

            let merged = merge_cart(account, guest);
            let ids: HashSet<String> = merged.iter().map(|l| l.product_id.to_string()).collect();
            assert_eq!(ids, expected_ids);
            for l in &merged {
                assert_eq!(l.quantity.get(), expected[l.product_id.as_str()]);
            }
        }
    }

    #[test]
    fn test_overlapping_carts_sum_per_product() {
        let account = vec![line("A", 2), line("B", 1), line("C", 9)];
        let guest = vec![line("C", 1), line("A", 5), line("D", 3)];

        let merged = merge_cart(account, guest);
        assert_eq!(pairs(&merged), vec![("A", 7), ("B", 1), ("C", 10), ("D", 3)]);
    }

    #[test]
    fn test_account_first_ordering() {
        let merged = merge_wishlist(vec![line("Y", 1)], vec![line("Z", 1), line("Y", 1)]);
        assert_eq!(pairs(&merged), vec![("Y", 1), ("Z", 1)]);
    }

    #[test]
    fn test_duplicates_within_one_side_are_folded() {
        let merged = merge_cart(vec![line("A", 1), line("A", 2)], vec![]);
        assert_eq!(pairs(&merged), vec![("A", 3)]);
    }

    #[test]
    fn test_wishlist_keeps_first_quantity() {
        let merged = merge_wishlist(vec![line("X", 1)], vec![line("X", 4)]);
        assert_eq!(pairs(&merged), vec![("X", 1)]);
    }

    #[test]
    fn test_snapshot_backfilled_only_when_missing() {
        let account = vec![
            line("X", 1),
            line("Y", 1).with_product(ProductSnapshot::titled("Account Y")),
        ];
        let guest = vec![
            line("X", 1).with_product(ProductSnapshot::titled("Guest X")),
            line("Y", 1).with_product(ProductSnapshot::titled("Guest Y")),
        ];

        let merged = merge_wishlist(account, guest);
        assert_eq!(merged[0].product.as_ref().unwrap().title, "Guest X");
        assert_eq!(merged[1].product.as_ref().unwrap().title, "Account Y");
    }

    #[test]
    fn test_strategy_per_collection() {
        assert_eq!(
            CollectionKind::Cart.merge_strategy(),
            MergeStrategy::SumQuantities
        );
        assert_eq!(
            CollectionKind::Wishlist.merge_strategy(),
            MergeStrategy::KeepFirst
        );
    }
}
