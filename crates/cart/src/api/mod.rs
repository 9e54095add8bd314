//! HTTP client for the stock and product service.
//!
//! # Endpoints
//!
//! - `GET {base}/stock/{id}` → `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` → `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! Stock is never cached. Product metadata rarely changes and is cached in
//! memory via `moka` for the configured TTL.

mod client;

pub use client::ApiClient;

use rocket_cart_core::ProductId;
use thiserror::Error;

/// Errors that can occur when talking to the stock and product service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response described a different product than the one requested.
    #[error("Requested product {requested} but received {received}")]
    ProductMismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// Client could not be built from configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
