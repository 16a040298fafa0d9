//! Checkout orchestration flows against the mock backend.

#![allow(clippy::unwrap_used)]

use sandbar_client::{
    ApiClient, CheckoutFlow, CheckoutOutcome, CheckoutState, ClientConfig, ClientError, Settings,
};
use sandbar_core::cart::CartStore;
use sandbar_core::types::{Email, OrderId, ProductId};
use sandbar_core::wire::CheckoutContact;
use sandbar_integration_tests::TestBackend;

fn client_for(backend: &TestBackend) -> ApiClient {
    let settings = Settings::new(ClientConfig::default());
    settings.set_base_url(&backend.base_url()).unwrap();
    ApiClient::new(settings)
}

fn contact() -> CheckoutContact {
    CheckoutContact::from_email(Email::parse("shopper@example.com").unwrap())
}

/// Product 1 qty 2 + product 2 qty 1 + product 1 qty 1 again,
/// so the merged cart is {1: 3, 2: 1}.
fn seeded_cart() -> CartStore {
    let mut cart = CartStore::new();
    cart.add(ProductId::new(1), 2).unwrap();
    cart.add(ProductId::new(2), 1).unwrap();
    cart.add(ProductId::new(1), 1).unwrap();
    cart
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_successful_checkout_confirms_and_settles() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    let mut cart = seeded_cart();

    let mut flow = CheckoutFlow::new();
    let outcome = flow.submit(&client, &cart, &contact()).await;
    assert_eq!(flow.state(), CheckoutState::Succeeded);

    let confirmation = outcome.confirmation().unwrap();
    assert_eq!(confirmation.order_id, OrderId::new(42));
    assert_eq!(confirmation.total_cents, 1599);
    assert_eq!(confirmation.status, "paid");

    // The flow itself never touched the cart; settling clears it.
    assert_eq!(cart.len(), 2);
    assert!(outcome.settle(&mut cart));
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_checkout_payload_reaches_backend_intact() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    let cart = seeded_cart();

    let contact = CheckoutContact {
        email: Email::parse("shopper@example.com").unwrap(),
        coupon_code: Some("SAVE10".to_owned()),
        address: Some("123 Shore Rd".to_owned()),
        payment_token: Some("tok_demo".to_owned()),
    };
    CheckoutFlow::new().submit(&client, &cart, &contact).await;

    let body = backend.last_checkout().unwrap().body.unwrap();
    assert_eq!(body["user_email"], "shopper@example.com");
    assert_eq!(body["coupon_code"], "SAVE10");
    assert_eq!(body["address"], "123 Shore Rd");
    assert_eq!(body["payment_token"], "tok_demo");
    assert_eq!(
        body["items"],
        serde_json::json!([
            {"product_id": 1, "quantity": 3},
            {"product_id": 2, "quantity": 1},
        ])
    );
}

#[tokio::test]
async fn test_empty_cart_is_submitted_as_is() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    let cart = CartStore::new();

    let outcome = CheckoutFlow::new().submit(&client, &cart, &contact()).await;

    let confirmation = outcome.confirmation().unwrap();
    assert_eq!(confirmation.total_cents, 0);

    let body = backend.last_checkout().unwrap().body.unwrap();
    assert_eq!(body["items"], serde_json::json!([]));
}

// =============================================================================
// Failure Path
// =============================================================================

#[tokio::test]
async fn test_rejected_checkout_reports_verbatim_message_and_keeps_cart() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    client
        .settings()
        .set_scenario(Some("coupon-expired".to_owned()));
    let mut cart = seeded_cart();

    let mut flow = CheckoutFlow::new();
    let outcome = flow.submit(&client, &cart, &contact()).await;
    assert_eq!(flow.state(), CheckoutState::Failed);

    let error = outcome.error().unwrap();
    assert!(matches!(error, ClientError::Api { status: 422, .. }));
    assert_eq!(error.user_message(), "Coupon expired");

    // Cart untouched so the user can retry without re-entering items.
    assert!(!outcome.settle(&mut cart));
    assert_eq!(cart.quantity(ProductId::new(1)), 3);
    assert_eq!(cart.quantity(ProductId::new(2)), 1);
}

#[tokio::test]
async fn test_error_message_extraction_fallbacks() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    let cart = seeded_cart();

    for (scenario, expected) in [
        ("out-of-stock", "Out of stock"),
        ("server-error", "Internal error"),
        ("opaque-error", "HTTP 502: Bad Gateway"),
    ] {
        client.settings().set_scenario(Some(scenario.to_owned()));
        let outcome = CheckoutFlow::new().submit(&client, &cart, &contact()).await;
        assert_eq!(outcome.error().unwrap().user_message(), expected);
    }
}

#[tokio::test]
async fn test_transport_failure_is_a_network_error() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    // Nothing listens on the discard port.
    client.settings().set_base_url("http://127.0.0.1:9").unwrap();

    let outcome = CheckoutFlow::new()
        .submit(&client, &seeded_cart(), &contact())
        .await;

    assert!(matches!(
        outcome.error().unwrap(),
        ClientError::Network(_)
    ));
    assert!(backend.captured().is_empty());
}

// =============================================================================
// Resubmission
// =============================================================================

#[tokio::test]
async fn test_resubmission_after_failure_is_a_fresh_attempt() {
    let backend = TestBackend::spawn().await;
    let client = client_for(&backend);
    client
        .settings()
        .set_scenario(Some("coupon-expired".to_owned()));
    let mut cart = seeded_cart();

    let mut flow = CheckoutFlow::new();
    let failed = flow.submit(&client, &cart, &contact()).await;
    assert!(matches!(failed, CheckoutOutcome::Failed(_)));

    // Clear the scenario and try again with the same, untouched cart.
    client.settings().set_scenario(None);
    let outcome = flow.submit(&client, &cart, &contact()).await;
    assert_eq!(flow.state(), CheckoutState::Succeeded);
    assert_eq!(
        outcome.confirmation().unwrap().order_id,
        OrderId::new(42)
    );
    assert!(outcome.settle(&mut cart));
    assert!(cart.is_empty());
}
