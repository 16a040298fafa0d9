//! Integration tests for Sandbar.
//!
//! Provides [`TestBackend`], an in-process mock of the remote
//! catalog/checkout service. It serves both API versions, honors the
//! `include=inventory` query, drives failure paths off the `X-Scenario`
//! header, and captures every request for assertions.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sandbar-integration-tests
//! ```
//!
//! # Scenarios
//!
//! - `coupon-expired` - 422 with `{"detail":{"message":"Coupon expired"}}`
//! - `out-of-stock` - 400 with `{"detail":"Out of stock"}`
//! - `server-error` - 500 with `{"message":"Internal error"}`
//! - `opaque-error` - 502 with a non-JSON body
//!
//! Any other (or no) scenario confirms the checkout with order id 42 and a
//! `backend-trace-{n}` correlation id.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

/// Fixed demo catalog: (id, name, slug, category, price in cents, stock).
const SEED_PRODUCTS: &[(i64, &str, &str, i64, u64, u64)] = &[
    (1, "Driftwood Lamp", "home-driftwood-lamp", 1, 500, 12),
    (2, "Tide Pool Soap", "bath-tide-pool-soap", 2, 99, 40),
    (3, "Sandbar Towel", "beach-sandbar-towel", 3, 1250, 7),
];

/// Price lookup used by the mock checkout handler.
fn price_of(product_id: i64) -> u64 {
    SEED_PRODUCTS
        .iter()
        .find(|product| product.0 == product_id)
        .map_or(0, |product| product.4)
}

/// A request observed by the mock backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Path and query of the request.
    pub path: String,
    /// Value of the `X-Scenario` header, if sent.
    pub scenario: Option<String>,
    /// Value of the `x-request-id` header, if sent.
    pub request_id: Option<String>,
    /// Parsed JSON body for POST requests.
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct BackendState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    checkout_counter: Arc<AtomicU64>,
}

impl BackendState {
    fn capture(&self, path: &str, headers: &HeaderMap, body: Option<Value>) {
        let captured = CapturedRequest {
            path: path.to_owned(),
            scenario: header_value(headers, "x-scenario"),
            request_id: header_value(headers, "x-request-id"),
            body,
        };
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// In-process mock of the remote catalog/checkout service.
pub struct TestBackend {
    addr: SocketAddr,
    state: BackendState,
    server: tokio::task::JoinHandle<()>,
}

impl TestBackend {
    /// Bind an ephemeral port and start serving the mock routes.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = BackendState::default();

        let app = Router::new()
            .route("/api/v1/catalog", get(catalog))
            .route("/api/v2/catalog", get(catalog))
            .route("/api/v1/checkout", post(checkout))
            .route("/api/v2/checkout", post(checkout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend server error");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL for pointing a client at this backend.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// All requests observed so far, in arrival order.
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent checkout request, if any.
    #[must_use]
    pub fn last_checkout(&self) -> Option<CapturedRequest> {
        self.captured()
            .into_iter()
            .rev()
            .find(|request| request.path.contains("/checkout"))
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn catalog(
    State(state): State<BackendState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    state.capture(&uri.to_string(), &headers, None);

    let include_inventory = params
        .get("include")
        .is_some_and(|value| value.contains("inventory"));

    let products: Vec<Value> = SEED_PRODUCTS
        .iter()
        .map(|&(id, name, slug, category_id, price_cents, stock)| {
            json!({
                "id": id,
                "name": name,
                "slug": slug,
                "category_id": category_id,
                "price_cents": price_cents,
                "image_url": null,
                "inventory": include_inventory.then_some(stock),
            })
        })
        .collect();

    Json(Value::Array(products))
}

async fn checkout(
    State(state): State<BackendState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let scenario = header_value(&headers, "x-scenario");
    state.capture(&uri.to_string(), &headers, Some(body.clone()));

    match scenario.as_deref() {
        Some("coupon-expired") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": {"message": "Coupon expired"}})),
        )
            .into_response(),
        Some("out-of-stock") => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Out of stock"})),
        )
            .into_response(),
        Some("server-error") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Internal error"})),
        )
            .into_response(),
        Some("opaque-error") => (StatusCode::BAD_GATEWAY, "upstream exploded").into_response(),
        _ => {
            let n = state.checkout_counter.fetch_add(1, Ordering::SeqCst) + 1;
            let total = order_total(&body);
            Json(json!({
                "order_id": 42,
                "total_cents": total,
                "status": "paid",
                "trace_id": format!("backend-trace-{n}"),
            }))
            .into_response()
        }
    }
}

/// Total of a checkout body's items against the seeded prices.
fn order_total(body: &Value) -> u64 {
    body.get("items")
        .and_then(Value::as_array)
        .map_or(0, |items| {
            items
                .iter()
                .map(|item| {
                    let id = item.get("product_id").and_then(Value::as_i64).unwrap_or(0);
                    let quantity = item.get("quantity").and_then(Value::as_u64).unwrap_or(0);
                    price_of(id) * quantity
                })
                .sum()
        })
}
