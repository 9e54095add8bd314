//! Integration tests for the stock and product HTTP client.
//!
//! Each test starts its own [`MockService`] on an ephemeral port.
//!
//! Run with: cargo test -p rocket-cart-integration-tests --test `api_client`

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rocket_cart::{ApiClient, ApiConfig, ApiError, Price, ProductId};
use rocket_cart_integration_tests::{Fault, MockService};
use secrecy::SecretString;

async fn service_with_catalog() -> MockService {
    let service = MockService::start().await;
    service.add_product(1, "Tênis de Caminhada Leve Confortável", 17_990, 3);
    service.add_product(2, "Tênis VR Caminhada Confortável Detalhes Couro", 13_990, 5);
    service
}

fn client_for(service: &MockService) -> ApiClient {
    ApiClient::new(&ApiConfig::new(service.base_url())).expect("Failed to create API client")
}

// ============================================================================
// Stock
// ============================================================================

#[tokio::test]
async fn test_get_stock() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    let stock = client.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(stock.id, ProductId::new(1));
    assert_eq!(stock.amount, 3);
}

#[tokio::test]
async fn test_stock_is_never_cached() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    assert_eq!(client.get_stock(ProductId::new(1)).await.unwrap().amount, 3);
    service.set_stock(1, 1);
    assert_eq!(client.get_stock(ProductId::new(1)).await.unwrap().amount, 1);

    assert_eq!(service.stock_requests(), 2);
}

#[tokio::test]
async fn test_unknown_stock_is_not_found() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    let err = client.get_stock(ProductId::new(99)).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(ref path) if path == "/stock/99"));
}

#[tokio::test]
async fn test_stock_mismatch_is_rejected() {
    let service = service_with_catalog().await;
    service.mismatch(1);
    let client = client_for(&service);

    let err = client.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::ProductMismatch { requested, received }
            if requested == ProductId::new(1) && received == ProductId::new(1001)
    ));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_get_product() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    let product = client.get_product(ProductId::new(2)).await.unwrap();

    assert_eq!(product.id, ProductId::new(2));
    assert_eq!(product.title, "Tênis VR Caminhada Confortável Detalhes Couro");
    assert_eq!(product.price, Price::from_cents(13_990));
    assert_eq!(product.image, "https://cdn.example.com/2.jpg");
}

#[tokio::test]
async fn test_product_metadata_is_cached() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    let first = client.get_product(ProductId::new(1)).await.unwrap();
    let second = client.get_product(ProductId::new(1)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(service.product_requests(), 1);
}

#[tokio::test]
async fn test_zero_ttl_fetches_every_time() {
    let service = service_with_catalog().await;
    let mut config = ApiConfig::new(service.base_url());
    config.product_cache_ttl = Duration::ZERO;
    let client = ApiClient::new(&config).unwrap();

    client.get_product(ProductId::new(1)).await.unwrap();
    client.get_product(ProductId::new(1)).await.unwrap();

    assert_eq!(service.product_requests(), 2);
}

#[tokio::test]
async fn test_failed_product_lookup_is_not_cached() {
    let service = service_with_catalog().await;
    service.fail_product(1, Fault::ServerError);
    let client = client_for(&service);

    assert!(client.get_product(ProductId::new(1)).await.is_err());

    service.clear_faults();
    let product = client.get_product(ProductId::new(1)).await.unwrap();

    assert_eq!(product.id, ProductId::new(1));
    assert_eq!(service.product_requests(), 2);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_is_status() {
    let service = service_with_catalog().await;
    service.fail_stock(1, Fault::ServerError);
    let client = client_for(&service);

    let err = client.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, ref message } if message == "boom"));
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let service = service_with_catalog().await;
    service.fail_stock(1, Fault::RateLimited);
    let client = client_for(&service);

    let err = client.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_garbage_body_is_parse_error() {
    let service = service_with_catalog().await;
    service.fail_product(2, Fault::Garbage);
    let client = client_for(&service);

    let err = client.get_product(ProductId::new(2)).await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_http_error() {
    let service = service_with_catalog().await;
    let client = client_for(&service);
    service.stop().await;

    let err = client.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, ApiError::Http(_)));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let service = service_with_catalog().await;
    let mut config = ApiConfig::new(service.base_url());
    config.token = Some(SecretString::from("integration-token".to_string()));
    let client = ApiClient::new(&config).unwrap();

    client.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(
        service.last_authorization().as_deref(),
        Some("Bearer integration-token")
    );
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let service = service_with_catalog().await;
    let client = client_for(&service);

    client.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(service.last_authorization(), None);
}
