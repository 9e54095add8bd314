//! The cart value type.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, unique by product ID.
//! Every modifying operation returns a new `Cart` and leaves `self` untouched,
//! so a caller can validate, persist and only then swap the new state in.

use std::num::NonZeroU32;

use serde::Serialize;
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::{LineItem, Product};

/// Two line items in a candidate cart share a product ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("product {0} appears more than once")]
pub struct DuplicateProduct(pub ProductId);

/// Ordered collection of line items, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, rejecting duplicate product IDs.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateProduct`] naming the first repeated ID.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, DuplicateProduct> {
        for (index, item) in items.iter().enumerate() {
            let id = item.product_id();
            if items.iter().skip(index + 1).any(|other| other.product_id() == id) {
                return Err(DuplicateProduct(id));
            }
        }
        Ok(Self { items })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity of a product in the cart, or 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, LineItem::quantity)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Add one unit of `product`, merging into an existing line if present.
    #[must_use]
    pub fn with_added(&self, product: Product) -> Self {
        let id = product.id;
        self.with_incremented(id).unwrap_or_else(|| {
            let mut items = self.items.clone();
            items.push(LineItem::single(product));
            Self { items }
        })
    }

    /// Increment an existing line by one unit.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_incremented(&self, id: ProductId) -> Option<Self> {
        let current = self.get(id)?.amount;
        Some(self.with_line_amount(id, current.saturating_add(1)))
    }

    /// Set an existing line to an absolute quantity.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: NonZeroU32) -> Option<Self> {
        self.get(id)?;
        Some(self.with_line_amount(id, amount))
    }

    /// Drop the line for a product.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        self.get(id)?;
        let items = self
            .items
            .iter()
            .filter(|item| item.product_id() != id)
            .cloned()
            .collect();
        Some(Self { items })
    }

    fn with_line_amount(&self, id: ProductId, amount: NonZeroU32) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.product_id() == id {
                    LineItem {
                        product: item.product.clone(),
                        amount,
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
