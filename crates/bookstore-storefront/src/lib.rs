//! Session-aware bookstore.
//!
//! [`Storefront`] ties the catalog, per-session carts, accounts, the order
//! registry, the payment gateway and the notifier together behind one API.
//!
//! ```rust
//! use bookstore_storefront::{StoreConfig, Storefront};
//!
//! let store = Storefront::new(&StoreConfig {
//!     seed_demo_account: false,
//!     ..StoreConfig::default()
//! })
//! .unwrap();
//! let session = store.open_session();
//! store.add_to_cart(&session, "1984", "2").unwrap();
//! assert_eq!(store.cart(&session).unwrap().total.display(), "$17.98");
//! ```

pub mod config;
mod error;
mod storefront;

pub use config::{BookConfig, DiscountConfig, HashingConfig, StoreConfig};
pub use error::StoreError;
pub use storefront::{CartView, Quote, Storefront};
