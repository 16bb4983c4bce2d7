//! Change notifications for guest collections.
//!
//! Views that render a cart badge or wishlist subscribe here instead of
//! polling storage; every write through a guest store publishes one event.

use tokio::sync::broadcast;

use shopfront_core::CollectionKind;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// What happened to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChange {
    Updated,
    Cleared,
}

/// A guest collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEvent {
    pub kind: CollectionKind,
    pub change: StorageChange,
}

/// Publish/subscribe hub shared by the guest stores of one session.
#[derive(Debug, Clone)]
pub struct StorageEvents {
    sender: broadcast::Sender<StorageEvent>,
}

impl StorageEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, event: StorageEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

impl Default for StorageEvents {
    fn default() -> Self {
        Self::new()
    }
}
