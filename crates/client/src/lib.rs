//! Shopfront client.
//!
//! Client-side session model for the Shopfront api:
//!
//! - [`GuestStore`] keeps the signed-out cart and wishlist in local storage
//! - [`AuthRefresh`] renews an expired access cookie once per request
//! - [`AccountApi`] reads and patches the signed-in user
//! - [`ShopSession`] ties them together and merges guest lines at login
//!
//! ```rust,ignore
//! use shopfront_client::{ClientConfig, ShopSession};
//!
//! let config = ClientConfig::from_env()?;
//! let mut session = ShopSession::connect(&config, |route: &str| open(route))?;
//! session.restore().await?;
//! session.add_to_cart("prod_1", Quantity::ONE, None).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod guest;
pub mod interceptor;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod testing;

pub use api::AccountApi;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ErrorKind};
pub use events::{StorageChange, StorageEvent, StorageEvents};
pub use guest::{GUEST_CART_KEY, GUEST_WISHLIST_KEY, GuestStore};
pub use interceptor::{AuthRefresh, LOGIN_ROUTE, Navigator, REFRESH_PATH};
pub use session::ShopSession;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
