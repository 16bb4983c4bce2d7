//! Guest cart and wishlist persisted in local storage.
//!
//! A guest store exists only while the visitor is signed out. Reads never
//! fail: a missing, unreadable or corrupt slot reads as an empty collection
//! and the problem is logged.

use std::sync::Arc;

use tracing::warn;

use shopfront_core::{CollectionKind, LineItem};

use crate::events::{StorageChange, StorageEvent, StorageEvents};
use crate::storage::{Storage, StorageError};

/// Storage key of the guest cart.
pub const GUEST_CART_KEY: &str = "guest_cart";

/// Storage key of the guest wishlist.
pub const GUEST_WISHLIST_KEY: &str = "guest_wishlist";

/// Storage key holding the given collection.
#[must_use]
pub const fn storage_key(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Cart => GUEST_CART_KEY,
        CollectionKind::Wishlist => GUEST_WISHLIST_KEY,
    }
}

/// One guest collection bound to its storage slot.
#[derive(Clone)]
pub struct GuestStore {
    kind: CollectionKind,
    storage: Arc<dyn Storage>,
    events: StorageEvents,
}

impl GuestStore {
    #[must_use]
    pub fn new(kind: CollectionKind, storage: Arc<dyn Storage>, events: StorageEvents) -> Self {
        Self {
            kind,
            storage,
            events,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Current lines, or an empty list if the slot is absent or unusable.
    #[must_use]
    pub fn get(&self) -> Vec<LineItem> {
        let key = storage_key(self.kind);
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read guest collection");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding corrupt guest collection");
            Vec::new()
        })
    }

    /// Overwrite the stored lines and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be encoded or written.
    pub fn set(&self, lines: &[LineItem]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(lines)?;
        self.storage.set_item(storage_key(self.kind), &raw)?;
        self.events.publish(StorageEvent {
            kind: self.kind,
            change: StorageChange::Updated,
        });
        Ok(())
    }

    /// Remove the slot and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(storage_key(self.kind))?;
        self.events.publish(StorageEvent {
            kind: self.kind,
            change: StorageChange::Cleared,
        });
        Ok(())
    }
}

impl std::fmt::Debug for GuestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestStore")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
