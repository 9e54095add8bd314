//! Cart operation and initialization errors.
//!
//! [`CartError`] never escapes a cart operation as an `Err`; it is logged,
//! turned into a [`Notice`] and handed back inside
//! [`crate::CartOutcome::Rejected`] for callers that want the detail.
//! [`LoadError`] is the one error that does propagate: a cart that cannot be
//! read at startup must not be silently replaced by an empty one.

use rocket_cart_core::{CodecError, ProductId};
use thiserror::Error;

use crate::notify::Notice;
use crate::storage::StorageError;

/// Boxed collaborator error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a cart operation did not apply.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity exceeds the units in stock.
    #[error("requested {requested} of product {product_id}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The stock oracle failed.
    #[error("stock lookup for product {product_id} failed: {source}")]
    Stock {
        product_id: ProductId,
        #[source]
        source: BoxError,
    },

    /// The product catalog failed.
    #[error("product lookup for {product_id} failed: {source}")]
    Catalog {
        product_id: ProductId,
        #[source]
        source: BoxError,
    },

    /// The updated cart could not be written.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),

    /// The updated cart could not be encoded.
    #[error("failed to persist cart: {0}")]
    Codec(#[from] CodecError),
}

impl CartError {
    /// Notice shown for this error. Stock rejections share one message; every
    /// other failure gets the operation's generic `fallback`.
    #[must_use]
    pub const fn notice(&self, fallback: Notice) -> Notice {
        match self {
            Self::OutOfStock { .. } => Notice::OutOfStock,
            _ => fallback,
        }
    }

    /// Whether this is an expected business-rule rejection rather than a fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::OutOfStock { .. } | Self::NotInCart(_))
    }
}

/// Errors loading the persisted cart at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read persisted cart: {0}")]
    Storage(#[from] StorageError),

    #[error("persisted cart is corrupt: {0}")]
    Corrupt(#[from] CodecError),
}
