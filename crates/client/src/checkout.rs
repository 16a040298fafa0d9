//! Checkout orchestration.
//!
//! A [`CheckoutFlow`] drives a single checkout attempt:
//! Idle -> InFlight -> Succeeded | Failed. The payload is snapshotted
//! from the cart synchronously at submission time, so mutations made
//! while the request is in flight never affect the payload in transit.
//!
//! The flow never mutates the cart. On success the caller applies the
//! clear as an explicit follow-up via [`CheckoutOutcome::settle`]; an
//! abandoned flow simply never settles.

use tracing::{info, instrument};

use sandbar_core::cart::CartStore;
use sandbar_core::wire::{CheckoutContact, CheckoutRequest, CheckoutResponse};

use crate::api::ApiClient;
use crate::error::ClientError;

/// Lifecycle of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// No submission has been made yet.
    #[default]
    Idle,
    /// A submission is awaiting the service's response.
    InFlight,
    /// Terminal: the service confirmed the order.
    Succeeded,
    /// Terminal: the submission failed; the cart is untouched.
    Failed,
}

/// Result of a checkout attempt.
///
/// Failures carry the client error unchanged; no translation is applied
/// beyond the message already extracted by the API client.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The order was confirmed.
    Succeeded(CheckoutResponse),
    /// The submission failed; the cart was left untouched so the user can
    /// retry without re-entering items.
    Failed(ClientError),
}

impl CheckoutOutcome {
    /// Apply this outcome to the cart: clears it after a successful
    /// checkout, leaves it untouched otherwise.
    ///
    /// Returns whether the cart was cleared. Callers that no longer
    /// observe the cart (e.g. the owning screen went away) can skip this
    /// step entirely.
    pub fn settle(&self, cart: &mut CartStore) -> bool {
        match self {
            Self::Succeeded(_) => {
                cart.clear();
                true
            }
            Self::Failed(_) => false,
        }
    }

    /// The order confirmation, if the attempt succeeded.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&CheckoutResponse> {
        match self {
            Self::Succeeded(response) => Some(response),
            Self::Failed(_) => None,
        }
    }

    /// The error, if the attempt failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(error) => Some(error),
        }
    }
}

/// State machine over a single checkout attempt.
///
/// Re-invoking [`CheckoutFlow::submit`] after a terminal state starts a
/// fresh attempt; there is no implicit retry or backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutFlow {
    state: CheckoutState,
}

impl CheckoutFlow {
    /// A flow in the idle state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
        }
    }

    /// Current state of the flow.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Submit the current cart contents plus contact fields as a checkout.
    ///
    /// The payload is captured synchronously before the network call
    /// suspends. An empty cart is submitted as-is; validating
    /// non-emptiness is the calling surface's concern, not the flow's.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        cart: &CartStore,
        contact: &CheckoutContact,
    ) -> CheckoutOutcome {
        let payload = cart.to_checkout_payload(contact);
        self.state = CheckoutState::InFlight;

        match self.dispatch(client, &payload).await {
            Ok(response) => {
                self.state = CheckoutState::Succeeded;
                CheckoutOutcome::Succeeded(response)
            }
            Err(error) => {
                self.state = CheckoutState::Failed;
                CheckoutOutcome::Failed(error)
            }
        }
    }

    #[instrument(skip_all, fields(items = payload.items.len()))]
    async fn dispatch(
        &self,
        client: &ApiClient,
        payload: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError> {
        let response = client.submit_checkout(payload).await?;
        info!(order_id = %response.order_id, status = %response.status, "checkout confirmed");
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sandbar_core::types::{OrderId, ProductId};

    fn seeded_cart() -> CartStore {
        let mut cart = CartStore::new();
        cart.add(ProductId::new(1), 3).unwrap();
        cart.add(ProductId::new(2), 1).unwrap();
        cart
    }

    #[test]
    fn test_new_flow_is_idle() {
        assert_eq!(CheckoutFlow::new().state(), CheckoutState::Idle);
        assert_eq!(CheckoutFlow::default().state(), CheckoutState::Idle);
    }

    #[test]
    fn test_settle_clears_cart_on_success() {
        let mut cart = seeded_cart();
        let outcome = CheckoutOutcome::Succeeded(CheckoutResponse {
            order_id: OrderId::new(42),
            total_cents: 1599,
            status: "paid".to_owned(),
            trace_id: None,
        });

        assert!(outcome.settle(&mut cart));
        assert!(cart.is_empty());
        assert_eq!(
            outcome.confirmation().unwrap().order_id,
            OrderId::new(42)
        );
    }

    #[test]
    fn test_settle_leaves_cart_on_failure() {
        let mut cart = seeded_cart();
        let outcome = CheckoutOutcome::Failed(ClientError::Api {
            status: 422,
            message: "Coupon expired".to_owned(),
        });

        assert!(!outcome.settle(&mut cart));
        assert_eq!(cart.quantity(ProductId::new(1)), 3);
        assert_eq!(cart.quantity(ProductId::new(2)), 1);
        assert_eq!(outcome.error().unwrap().user_message(), "Coupon expired");
    }

    #[test]
    fn test_unsettled_outcome_never_touches_cart() {
        // A caller that went away just drops the outcome.
        let cart = seeded_cart();
        let before = cart.clone();
        let outcome = CheckoutOutcome::Succeeded(CheckoutResponse {
            order_id: OrderId::new(7),
            total_cents: 100,
            status: "confirmed".to_owned(),
            trace_id: Some("abc".to_owned()),
        });
        drop(outcome);
        assert_eq!(cart, before);
    }
}
