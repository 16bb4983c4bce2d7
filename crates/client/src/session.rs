//! The shopping session: guest collections, the signed-in account and the
//! reconciliation between them.
//!
//! A [`ShopSession`] routes every cart and wishlist mutation to one side.
//! While signed out the lines live in the guest stores; once signed in they
//! live on the user record and each mutation replaces the whole field on the
//! api. [`ShopSession::complete_login`] runs the one-time merge in between.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use shopfront_core::{
    CollectionKind, LineItem, ProductId, ProductSnapshot, Quantity, User, UserId, UserPatch,
    merge_cart, merge_wishlist, total_quantity,
};

use crate::api::AccountApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::StorageEvents;
use crate::guest::GuestStore;
use crate::interceptor::{AuthRefresh, Navigator};
use crate::storage::Storage;
use crate::transport::{HttpTransport, Transport};

/// Session context owning both guest stores and the account api.
#[derive(Debug)]
pub struct ShopSession<T, N> {
    api: AccountApi<T, N>,
    cart: GuestStore,
    wishlist: GuestStore,
    events: StorageEvents,
    user: Option<User>,
    /// Account the guest collections were last merged into.
    merged_into: Option<UserId>,
}

impl<N: Navigator> ShopSession<HttpTransport, N> {
    /// Build a session over HTTP from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage or the HTTP client cannot be set up.
    pub fn connect(config: &ClientConfig, navigator: N) -> Result<Self, ClientError> {
        let storage = config.open_storage()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            AccountApi::new(AuthRefresh::new(transport, navigator)),
            storage,
        ))
    }
}

impl<T: Transport, N: Navigator> ShopSession<T, N> {
    /// Create a signed-out session over the given storage.
    #[must_use]
    pub fn new(api: AccountApi<T, N>, storage: Arc<dyn Storage>) -> Self {
        let events = StorageEvents::new();
        Self {
            api,
            cart: GuestStore::new(CollectionKind::Cart, storage.clone(), events.clone()),
            wishlist: GuestStore::new(CollectionKind::Wishlist, storage, events.clone()),
            events,
            user: None,
            merged_into: None,
        }
    }

    #[must_use]
    pub const fn api(&self) -> &AccountApi<T, N> {
        &self.api
    }

    /// Change notifications for the guest collections.
    #[must_use]
    pub const fn events(&self) -> &StorageEvents {
        &self.events
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Pick up an existing session, if any.
    ///
    /// The probe never navigates to login; without a usable session the
    /// visitor simply stays a guest.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than missing credentials.
    #[instrument(skip(self))]
    pub async fn restore(&mut self) -> Result<Option<&User>, ClientError> {
        match self.api.current_user_silent().await {
            Ok(user) => {
                info!(user_id = %user.id, "restored session");
                Ok(Some(&*self.user.insert(user)))
            }
            Err(e) if e.is_auth_failure() => {
                self.user = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Finish a login by folding the guest collections into the account.
    ///
    /// Both merged lists are written in a single update. The guest stores
    /// are left alone until that update has succeeded, so a failed update
    /// can be retried without losing guest lines. Once it has succeeded the
    /// session is signed in and the merge is not repeated for that user,
    /// even if the guest stores could not be emptied.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be fetched or updated.
    #[instrument(skip(self))]
    pub async fn complete_login(&mut self) -> Result<&User, ClientError> {
        let account = self.api.current_user().await?;
        if self.merged_into.as_ref() == Some(&account.id) {
            return Ok(&*self.user.insert(account));
        }

        let guest_cart = self.cart.get();
        let guest_wishlist = self.wishlist.get();

        if guest_cart.is_empty() && guest_wishlist.is_empty() {
            info!(user_id = %account.id, "signed in, no guest lines to merge");
            return Ok(&*self.user.insert(account));
        }

        let merged_lines = guest_cart.len() + guest_wishlist.len();
        let patch = UserPatch {
            cart: Some(merge_cart(account.cart, guest_cart)),
            wishlist: Some(merge_wishlist(account.wishlist, guest_wishlist)),
            ..UserPatch::default()
        };
        let user = self.api.update_user(&account.id, &patch).await?;
        info!(user_id = %user.id, merged_lines, "merged guest collections into account");
        self.merged_into = Some(user.id.clone());

        discard_merged(&self.cart);
        discard_merged(&self.wishlist);

        Ok(&*self.user.insert(user))
    }

    /// Current lines of a collection, from the account when signed in.
    #[must_use]
    pub fn lines(&self, kind: CollectionKind) -> Vec<LineItem> {
        match (&self.user, kind) {
            (Some(user), kind) => user.collection(kind).to_vec(),
            (None, CollectionKind::Cart) => self.cart.get(),
            (None, CollectionKind::Wishlist) => self.wishlist.get(),
        }
    }

    #[must_use]
    pub fn cart(&self) -> Vec<LineItem> {
        self.lines(CollectionKind::Cart)
    }

    #[must_use]
    pub fn wishlist(&self) -> Vec<LineItem> {
        self.lines(CollectionKind::Wishlist)
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        total_quantity(&self.cart())
    }

    /// Add units of a product, summing with any existing line.
    ///
    /// A supplied snapshot replaces the one already on the line, so the cart
    /// shows what the shopper was looking at when they last added it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn add_to_cart(
        &mut self,
        product_id: impl Into<ProductId>,
        quantity: Quantity,
        product: Option<ProductSnapshot>,
    ) -> Result<(), ClientError> {
        let product_id = product_id.into();
        let mut lines = merge_cart(self.cart(), vec![LineItem::new(product_id.clone(), quantity)]);

        if let Some(product) = product
            && let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id)
        {
            line.product = Some(product);
        }

        self.write(CollectionKind::Cart, lines).await
    }

    /// Set the quantity of a cart line; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), ClientError> {
        let Some(quantity) = Quantity::new(quantity) else {
            return self.remove_from_cart(product_id).await;
        };

        let mut lines = self.cart();
        let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) else {
            return Ok(());
        };
        line.quantity = quantity;
        self.write(CollectionKind::Cart, lines).await
    }

    /// Drop a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<(), ClientError> {
        let mut lines = self.cart();
        let before = lines.len();
        lines.retain(|l| &l.product_id != product_id);
        if lines.len() == before {
            return Ok(());
        }
        self.write(CollectionKind::Cart, lines).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn clear_cart(&mut self) -> Result<(), ClientError> {
        match self.user {
            Some(_) => self.write(CollectionKind::Cart, Vec::new()).await,
            None => Ok(self.cart.clear()?),
        }
    }

    /// Add the product to the wishlist, or remove it if present. Returns
    /// whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn toggle_wishlist(
        &mut self,
        product_id: impl Into<ProductId>,
        product: Option<ProductSnapshot>,
    ) -> Result<bool, ClientError> {
        let product_id = product_id.into();
        let mut lines = self.wishlist();

        let present = if let Some(position) = lines.iter().position(|l| l.product_id == product_id) {
            lines.remove(position);
            false
        } else {
            let mut line = LineItem::new(product_id, Quantity::ONE);
            line.product = product;
            lines.push(line);
            true
        };

        self.write(CollectionKind::Wishlist, lines).await?;
        Ok(present)
    }

    /// Invalidate the session and fall back to guest mode.
    ///
    /// The cached user is dropped even if the api call fails; an already
    /// expired session is not an error.
    ///
    /// # Errors
    ///
    /// Returns transport or server errors from the logout call.
    #[instrument(skip(self))]
    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        let result = self.api.logout().await;
        self.user = None;
        self.merged_into = None;

        match result {
            Err(e) if e.is_auth_failure() => Ok(()),
            Err(e) => {
                warn!(error = %e, "logout request failed");
                Err(e)
            }
            Ok(()) => {
                info!("signed out");
                Ok(())
            }
        }
    }

    async fn write(&mut self, kind: CollectionKind, lines: Vec<LineItem>) -> Result<(), ClientError> {
        let Some(user_id) = self.user.as_ref().map(|u| u.id.clone()) else {
            let store = match kind {
                CollectionKind::Cart => &self.cart,
                CollectionKind::Wishlist => &self.wishlist,
            };
            return Ok(store.set(&lines)?);
        };

        let user = self
            .api
            .update_user(&user_id, &UserPatch::collection(kind, lines))
            .await?;
        self.user = Some(user);
        Ok(())
    }
}

/// Empty a guest store whose lines are already on the account.
///
/// If the slot cannot be removed it is overwritten with an empty list
/// instead; a store that refuses both is logged and left as is.
fn discard_merged(store: &GuestStore) {
    let Err(e) = store.clear() else {
        return;
    };
    warn!(kind = %store.kind(), error = %e, "failed to clear merged guest lines");

    if let Err(e) = store.set(&[]) {
        warn!(kind = %store.kind(), error = %e, "merged guest lines left in storage");
    }
}
