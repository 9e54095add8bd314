//! Integration tests for Rocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-cart-integration-tests
//! ```
//!
//! No external services are needed: [`MockService`] serves the stock and
//! product endpoints from memory on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `api_client` - HTTP client behavior against the mock service
//! - `cart_store` - End-to-end cart operations with file-backed persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocket_cart_core::{Price, Product, ProductId, StockSnapshot};
use tokio::task::JoinHandle;
use url::Url;

/// In-memory stock and product service.
///
/// Aborts its server task on drop.
pub struct MockService {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

/// How a mocked endpoint should misbehave for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Respond 500.
    ServerError,
    /// Respond 429 with `Retry-After: 7`.
    RateLimited,
    /// Respond 200 with a body that is not JSON.
    Garbage,
}

#[derive(Default)]
struct MockState {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    stock_faults: Mutex<HashMap<ProductId, Fault>>,
    product_faults: Mutex<HashMap<ProductId, Fault>>,
    mismatched: Mutex<HashSet<ProductId>>,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

impl MockService {
    /// Start the service on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().expect("Mock service has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the running service.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Mock address is a valid URL")
    }

    /// Register a product with a stock level.
    pub fn add_product(&self, id: i32, title: &str, cents: i64, stock: u32) {
        let product = Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(cents),
            image: format!("https://cdn.example.com/{id}.jpg"),
        };
        lock(&self.state.products).insert(product.id, product);
        self.set_stock(id, stock);
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(ProductId::new(id), amount);
    }

    pub fn fail_stock(&self, id: i32, fault: Fault) {
        lock(&self.state.stock_faults).insert(ProductId::new(id), fault);
    }

    pub fn fail_product(&self, id: i32, fault: Fault) {
        lock(&self.state.product_faults).insert(ProductId::new(id), fault);
    }

    /// Answer requests for `id` with a payload describing another product.
    pub fn mismatch(&self, id: i32) {
        lock(&self.state.mismatched).insert(ProductId::new(id));
    }

    pub fn clear_faults(&self) {
        lock(&self.state.stock_faults).clear();
        lock(&self.state.product_faults).clear();
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state.last_authorization).clone()
    }
}

impl MockService {
    /// Shut the server down and wait until its port is closed.
    ///
    /// Returns the URL it was serving on, which now refuses connections.
    pub async fn stop(mut self) -> Url {
        let url = self.base_url();
        self.handle.abort();
        let _ = (&mut self.handle).await;
        url
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fault_response(fault: Fault) -> Response {
    match fault {
        Fault::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Fault::RateLimited => {
            let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from_static("7"));
            response
        }
        Fault::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}

fn record_authorization(state: &MockState, headers: &axum::http::HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *lock(&state.last_authorization) = value;
}

async fn stock(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i32>,
    headers: axum::http::HeaderMap,
) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    record_authorization(&state, &headers);
    let id = ProductId::new(id);

    if let Some(fault) = lock(&state.stock_faults).get(&id).copied() {
        return fault_response(fault);
    }

    let Some(amount) = lock(&state.stock).get(&id).copied() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let reported = if lock(&state.mismatched).contains(&id) {
        ProductId::new(id.as_i32() + 1000)
    } else {
        id
    };

    Json(StockSnapshot {
        id: reported,
        amount,
    })
    .into_response()
}

async fn product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i32>,
    headers: axum::http::HeaderMap,
) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    record_authorization(&state, &headers);
    let id = ProductId::new(id);

    if let Some(fault) = lock(&state.product_faults).get(&id).copied() {
        return fault_response(fault);
    }

    let Some(mut product) = lock(&state.products).get(&id).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if lock(&state.mismatched).contains(&id) {
        product.id = ProductId::new(id.as_i32() + 1000);
    }

    // Serve the price as a JSON number, the way the real service does
    let price: f64 = product.price.amount().to_string().parse().unwrap_or_default();

    Json(serde_json::json!({
        "id": product.id,
        "title": product.title,
        "price": price,
        "image": product.image,
    }))
    .into_response()
}
