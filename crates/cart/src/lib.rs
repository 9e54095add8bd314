//! Rocket Cart - Stock-validated shopping cart with a durable local mirror.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and exposes add, remove and update-quantity
//!   operations. Each one checks the [`StockOracle`], builds a new cart,
//!   writes it to a [`KeyValueStore`] and only then makes it current.
//! - [`ApiClient`] implements [`StockOracle`] and [`ProductCatalog`] over
//!   HTTP with `reqwest`, caching product metadata with `moka`.
//! - Rejections surface as [`Notice`]s on a [`Notifier`]; operations never
//!   return `Err`.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart::{ApiClient, CartConfig, CartStore, FileStore, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let api = ApiClient::new(&config.api)?;
//! let storage = FileStore::new(&config.storage.dir);
//! let store = CartStore::load(api, storage, TracingNotifier, config.storage.key)?;
//!
//! store.add_product(ProductId::new(1)).await;
//! store.update_product_amount(ProductId::new(1), 3).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod oracle;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use config::{ApiConfig, CartConfig, ConfigError, StorageConfig};
pub use error::{CartError, LoadError};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use oracle::{ProductCatalog, StockOracle};
pub use rocket_cart_core::{Cart, LineItem, Price, Product, ProductId, StockSnapshot};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartOutcome, CartStore};
