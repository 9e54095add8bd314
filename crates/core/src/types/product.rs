//! Products, cart line items and stock snapshots.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product metadata as served by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Product image URL.
    pub image: String,
}

/// One product in the cart together with its chosen quantity.
///
/// Serializes flat, so a line item reads as the product fields plus `amount`.
/// The amount is never zero; a line dropping to zero is removed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: NonZeroU32,
}

impl LineItem {
    /// Create a line item holding a single unit of `product`.
    #[must_use]
    pub const fn single(product: Product) -> Self {
        Self {
            product,
            amount: NonZeroU32::MIN,
        }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Quantity as a plain integer.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.amount.get()
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.quantity())
    }
}

/// Units currently available for a product, as reported by the stock service.
///
/// Always fetched fresh; stock can change between two cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub id: ProductId,
    pub amount: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sneaker() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: Price::from_cents(17990),
            image: "https://example.com/sneaker.jpg".to_string(),
        }
    }

    #[test]
    fn test_line_item_serializes_flat() {
        let item = LineItem {
            product: sneaker(),
            amount: NonZeroU32::new(2).unwrap(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["amount"], 2);
        assert_eq!(value["title"], "Tênis de Caminhada Leve Confortável");
        assert!(value.get("product").is_none());
    }

    #[test]
    fn test_line_item_rejects_zero_amount() {
        let json = r#"{"id":1,"title":"x","price":10,"image":"y","amount":0}"#;
        assert!(serde_json::from_str::<LineItem>(json).is_err());
    }

    #[test]
    fn test_line_item_subtotal() {
        let item = LineItem {
            product: sneaker(),
            amount: NonZeroU32::new(3).unwrap(),
        };
        assert_eq!(item.subtotal(), Price::from_cents(53970));
    }

    #[test]
    fn test_stock_snapshot_decodes_service_payload() {
        let stock: StockSnapshot = serde_json::from_str(r#"{"id":3,"amount":8}"#).unwrap();
        assert_eq!(stock.id, ProductId::new(3));
        assert_eq!(stock.amount, 8);
    }
}
