//! JSON codec for the persisted cart.
//!
//! The blob is a JSON array of line items in insertion order, each item being
//! the product fields plus `amount`:
//!
//! ```json
//! [{"id":1,"title":"Sneaker","price":"179.9","image":"https://...","amount":2}]
//! ```
//!
//! Decoding is strict. A blob that is not valid JSON, holds a zero amount, or
//! repeats a product ID is an error; callers must surface it rather than start
//! over with an empty cart.

use thiserror::Error;

use crate::types::{Cart, DuplicateProduct, LineItem, ProductId};

/// Errors from encoding or decoding a persisted cart.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The blob is not a well-formed list of line items.
    #[error("malformed cart data: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The blob lists the same product twice.
    #[error("malformed cart data: product {0} appears more than once")]
    DuplicateProduct(ProductId),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<DuplicateProduct> for CodecError {
    fn from(err: DuplicateProduct) -> Self {
        Self::DuplicateProduct(err.0)
    }
}

/// Serialize a cart into its persisted text form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, CodecError> {
    serde_json::to_string(cart).map_err(CodecError::Encode)
}

/// Parse a persisted cart.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] for invalid JSON or invalid line items and
/// [`CodecError::DuplicateProduct`] if two items share a product ID.
pub fn decode(blob: &str) -> Result<Cart, CodecError> {
    let items: Vec<LineItem> = serde_json::from_str(blob).map_err(CodecError::Malformed)?;
    Ok(Cart::from_items(items)?)
}
