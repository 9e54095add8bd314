//! External collaborators the cart validates against.
//!
//! [`StockOracle`] answers "how many units of this product exist right now";
//! [`ProductCatalog`] supplies the metadata stored with a new line item. Both
//! may fail for any reason (network, timeout, bad payload) and the cart treats
//! every failure the same way. [`crate::ApiClient`] implements both against
//! the HTTP service.

use std::future::Future;

use rocket_cart_core::{Product, ProductId, StockSnapshot};

/// Authority for current stock levels.
pub trait StockOracle: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the units currently available for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockSnapshot, Self::Error>> + Send;
}

/// Source of product metadata.
pub trait ProductCatalog: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the product details for `id`.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, Self::Error>> + Send;
}
