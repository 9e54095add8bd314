//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_API_URL` - Base URL of the stock and product service
//!
//! ## Optional
//! - `CART_API_TOKEN` - Bearer token sent with every API request
//! - `CART_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CART_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL (default: 300)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: .rocket-cart)
//! - `CART_STORAGE_KEY` - Key of the persisted cart slot (default: @RocketShoes:cart)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Storage key the cart is persisted under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_STORAGE_DIR: &str = ".rocket-cart";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Stock and product service configuration
    pub api: ApiConfig,
    /// Durable storage configuration
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stock and product service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:3333`
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long fetched product metadata stays cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

/// Where the cart is persisted.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub dir: PathBuf,
    /// Key of the cart slot
    pub key: String,
}

impl ApiConfig {
    /// Configuration with default timeout and cache TTL for `base_url`.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(10),
            product_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = vars.required("CART_API_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;

        let api = ApiConfig {
            base_url,
            token: vars.optional("CART_API_TOKEN").map(SecretString::from),
            timeout: vars.nonzero_seconds("CART_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            product_cache_ttl: vars.seconds("CART_PRODUCT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
        };

        let storage = StorageConfig {
            dir: PathBuf::from(vars.or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            key: vars.or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
        };

        Ok(Self {
            api,
            storage,
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get a variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        self.or_default(key, default)
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Like `seconds`, but zero is rejected.
    fn nonzero_seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        let duration = self.seconds(key, default)?;
        if duration.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be at least 1 second".to_string(),
            ));
        }
        Ok(duration)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CART_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("CART_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CART_API_URL", "http://localhost:3333")]).unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage.dir, PathBuf::from(".rocket-cart"));
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CART_API_URL", "https://api.example.com/v1/"),
            ("CART_API_TOKEN", "tok_8f2KqL"),
            ("CART_API_TIMEOUT_SECS", "3"),
            ("CART_PRODUCT_CACHE_TTL_SECS", "0"),
            ("CART_STORAGE_DIR", "/tmp/carts"),
            ("CART_STORAGE_KEY", "cart:v2"),
        ])
        .unwrap();

        assert_eq!(config.api.token.unwrap().expose_secret(), "tok_8f2KqL");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.api.product_cache_ttl, Duration::ZERO);
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/carts"));
        assert_eq!(config.storage.key, "cart:v2");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[
            ("CART_API_URL", "http://localhost:3333"),
            ("CART_API_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_API_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = load(&[
            ("CART_API_URL", "http://localhost:3333"),
            ("CART_API_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_API_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
