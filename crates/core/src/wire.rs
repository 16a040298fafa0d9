//! Request/response shapes of the remote catalog/checkout service.
//!
//! These types mirror the JSON bodies exchanged with the backend. The
//! backend owns products and order confirmations; the client only ever
//! reads [`Product`] and [`CheckoutResponse`] and writes
//! [`CheckoutRequest`].

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Email, OrderId, ProductId};

/// A product in the remote catalog.
///
/// Immutable from the client's perspective; referenced by [`ProductId`]
/// from cart entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Category the product belongs to.
    pub category_id: CategoryId,
    /// Price in the smallest currency unit (cents).
    pub price_cents: u64,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Units in stock. Absent means unlimited or not requested.
    #[serde(default)]
    pub inventory: Option<u64>,
}

/// A single cart line: one product and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity, always >= 1.
    pub quantity: u32,
}

/// User-supplied contact and payment fields for a checkout.
///
/// Everything except the email is optional; the backend fills in demo
/// defaults for missing payment tokens.
#[derive(Debug, Clone)]
pub struct CheckoutContact {
    /// Where the order confirmation goes.
    pub email: Email,
    /// Promo code, if the user entered one.
    pub coupon_code: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// Opaque payment token.
    pub payment_token: Option<String>,
}

impl CheckoutContact {
    /// Contact with only an email, no coupon/address/payment fields.
    #[must_use]
    pub const fn from_email(email: Email) -> Self {
        Self {
            email,
            coupon_code: None,
            address: None,
            payment_token: None,
        }
    }
}

/// Checkout submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Customer email address.
    pub user_email: String,
    /// Cart lines being purchased. Order is irrelevant to the server.
    pub items: Vec<CartEntry>,
    /// Promo code.
    pub coupon_code: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// Opaque payment token.
    pub payment_token: Option<String>,
}

/// Order confirmation returned by a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Order ID assigned by the backend.
    pub order_id: OrderId,
    /// Charged total in cents.
    pub total_cents: u64,
    /// Order status (e.g. "confirmed", "paid").
    pub status: String,
    /// Backend-side correlation id for this checkout, when provided.
    #[serde(default)]
    pub trace_id: Option<String>,
}
