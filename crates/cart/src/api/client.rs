//! `reqwest` implementation of the stock oracle and product catalog.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocket_cart_core::{Product, ProductId, StockSnapshot};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use crate::config::ApiConfig;
use crate::oracle::{ProductCatalog, StockOracle};

/// Client for the stock and product service.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// `None` when the configured TTL is zero.
    products: Option<Cache<ProductId, Product>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Config(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: directory_url(config.base_url.clone()),
                products,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the current stock level of a product. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the product is unknown, or the
    /// response is malformed.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError> {
        let stock: StockSnapshot = self.get_json("stock", id).await?;
        check_id(id, stock.id)?;

        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    /// Get a product's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the product is unknown, or the
    /// response is malformed.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json("products", id).await?;
        check_id(id, product.id)?;

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }

    /// Fetch `{base}/{resource}/{id}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, ApiError> {
        let url = self
            .inner
            .base_url
            .join(&format!("{resource}/{id}"))
            .map_err(|e| ApiError::Config(format!("Invalid request URL: {e}")))?;

        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StockOracle for ApiClient {
    type Error = ApiError;

    async fn stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError> {
        self.get_stock(id).await
    }
}

impl ProductCatalog for ApiClient {
    type Error = ApiError;

    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_product(id).await
    }
}

/// Make sure relative joins append to the base path instead of replacing its
/// last segment.
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn check_id(requested: ProductId, received: ProductId) -> Result<(), ApiError> {
    if requested.as_i32() == received.as_i32() {
        Ok(())
    } else {
        Err(ApiError::ProductMismatch {
            requested,
            received,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_directory_url_appends_slash() {
        let url = directory_url(Url::parse("https://api.example.com/v1").unwrap());
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            url.join("stock/3").unwrap().as_str(),
            "https://api.example.com/v1/stock/3"
        );

        let root = directory_url(Url::parse("http://localhost:3333").unwrap());
        assert_eq!(root.join("products/1").unwrap().as_str(), "http://localhost:3333/products/1");
    }

    #[test]
    fn test_check_id() {
        assert!(check_id(ProductId::new(1), ProductId::new(1)).is_ok());
        assert!(matches!(
            check_id(ProductId::new(1), ProductId::new(2)),
            Err(ApiError::ProductMismatch { .. })
        ));
    }

    #[test]
    fn test_new_rejects_invalid_token() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.token = Some(SecretString::from("bad\ntoken"));
        assert!(matches!(ApiClient::new(&config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_zero_ttl_disables_product_cache() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.product_cache_ttl = Duration::ZERO;
        let client = ApiClient::new(&config).unwrap();
        assert!(client.inner.products.is_none());
    }
}
