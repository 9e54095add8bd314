//! The cart store: stock-validated mutations with persistence on every write.
//!
//! # Guarantees
//!
//! - Every operation either applies fully (new cart persisted, then swapped in
//!   and returned) or leaves both the in-memory cart and the storage slot
//!   untouched.
//! - Quantities never exceed the stock reported by the oracle during the
//!   operation that set them, and a product appears at most once.
//! - At most one operation runs at a time. Each operation holds the cart lock
//!   across its stock lookup, because it reads the cart before the lookup and
//!   writes it after.
//! - Operations never fail from the caller's point of view. Rejections and
//!   collaborator faults are logged, reported to the [`Notifier`] and returned
//!   as [`CartOutcome::Rejected`].

use std::num::NonZeroU32;
use std::sync::Arc;

use rocket_cart_core::{Cart, ProductId, codec};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CartError, LoadError};
use crate::notify::{Notice, Notifier};
use crate::oracle::{ProductCatalog, StockOracle};
use crate::storage::KeyValueStore;

/// Result of a cart operation.
#[derive(Debug)]
pub enum CartOutcome {
    /// The change was persisted; this is the new cart.
    Applied(Cart),
    /// Nothing changed. The notifier has already been told.
    Rejected(CartError),
    /// The request was a no-op (non-positive quantity update).
    Ignored,
}

impl CartOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The new cart, if the operation applied.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match self {
            Self::Applied(cart) => Some(cart),
            _ => None,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&CartError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// Shared handle to the cart.
///
/// Create one at startup with [`CartStore::load`] and clone it into every
/// component that needs the cart; clones share state.
pub struct CartStore<A> {
    inner: Arc<CartStoreInner<A>>,
}

struct CartStoreInner<A> {
    api: A,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    key: String,
    cart: Mutex<Cart>,
}

impl<A> Clone for CartStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for CartStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .finish_non_exhaustive()
    }
}

impl<A> CartStore<A>
where
    A: StockOracle + ProductCatalog,
{
    /// Load the cart persisted under `key`, or start empty if the slot is
    /// missing or blank.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Storage`] if the slot cannot be read and
    /// [`LoadError::Corrupt`] if its contents do not decode.
    pub fn load(
        api: A,
        storage: impl KeyValueStore + 'static,
        notifier: impl Notifier + 'static,
        key: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let key = key.into();

        // A blank slot holds no cart, same as a missing one
        let cart = match storage.get(&key)? {
            Some(blob) if !blob.trim().is_empty() => codec::decode(&blob)?,
            _ => Cart::new(),
        };

        info!(key = %key, items = cart.len(), "Cart loaded");

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                api,
                storage: Arc::new(storage),
                notifier: Arc::new(notifier),
                key,
                cart: Mutex::new(cart),
            }),
        })
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Snapshot of the current cart.
    ///
    /// Waits for an in-flight operation to finish.
    pub async fn cart(&self) -> Cart {
        self.inner.cart.lock().await.clone()
    }

    /// Add one unit of a product.
    ///
    /// Merges into the existing line if the product is already in the cart,
    /// otherwise fetches its metadata and appends a new line.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> CartOutcome {
        let mut cart = self.inner.cart.lock().await;
        let result = self.try_add(&cart, id).await;
        self.commit(&mut cart, result, Notice::AddFailed)
    }

    /// Remove a product's line entirely.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: ProductId) -> CartOutcome {
        let mut cart = self.inner.cart.lock().await;
        let result = cart.without(id).ok_or(CartError::NotInCart(id));
        self.commit(&mut cart, result, Notice::RemoveFailed)
    }

    /// Set a product's quantity to `amount`.
    ///
    /// A non-positive `amount` is ignored without contacting the stock oracle.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) -> CartOutcome {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive quantity");
            return CartOutcome::Ignored;
        }

        let mut cart = self.inner.cart.lock().await;
        let result = self.try_update(&cart, id, amount).await;
        self.commit(&mut cart, result, Notice::UpdateFailed)
    }

    async fn try_add(&self, cart: &Cart, id: ProductId) -> Result<Cart, CartError> {
        let available = self.available(id).await?;
        let current = cart.quantity_of(id);

        if current >= available {
            return Err(CartError::OutOfStock {
                product_id: id,
                requested: u64::from(current) + 1,
                available,
            });
        }

        if let Some(updated) = cart.with_incremented(id) {
            return Ok(updated);
        }

        let product = ProductCatalog::product(&self.inner.api, id)
            .await
            .map_err(|e| CartError::Catalog {
                product_id: id,
                source: Box::new(e),
            })?;

        Ok(cart.with_added(product))
    }

    async fn try_update(&self, cart: &Cart, id: ProductId, amount: i64) -> Result<Cart, CartError> {
        let available = self.available(id).await?;

        let out_of_stock = || CartError::OutOfStock {
            product_id: id,
            requested: amount.unsigned_abs(),
            available,
        };

        if amount > i64::from(available) {
            return Err(out_of_stock());
        }

        // amount is in 1..=available here, so it fits a NonZeroU32
        let amount = u32::try_from(amount)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(out_of_stock)?;

        cart.with_amount(id, amount).ok_or(CartError::NotInCart(id))
    }

    async fn available(&self, id: ProductId) -> Result<u32, CartError> {
        let stock = StockOracle::stock(&self.inner.api, id)
            .await
            .map_err(|e| CartError::Stock {
                product_id: id,
                source: Box::new(e),
            })?;
        Ok(stock.amount)
    }

    /// Persist `result` and swap it in, or report why not.
    fn commit(
        &self,
        current: &mut Cart,
        result: Result<Cart, CartError>,
        fallback: Notice,
    ) -> CartOutcome {
        match result.and_then(|updated| self.persist(&updated).map(|()| updated)) {
            Ok(updated) => {
                current.clone_from(&updated);
                info!(
                    items = updated.len(),
                    total_quantity = updated.total_quantity(),
                    "Cart updated"
                );
                CartOutcome::Applied(updated)
            }
            Err(err) => {
                if err.is_rejection() {
                    warn!(error = %err, "Cart operation rejected");
                } else {
                    error!(error = %err, "Cart operation failed");
                }
                self.inner.notifier.notify(err.notice(fallback));
                CartOutcome::Rejected(err)
            }
        }
    }

    fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        let blob = codec::encode(cart)?;
        self.inner.storage.set(&self.inner.key, &blob)?;
        Ok(())
    }
}
