//! The client-side cart store.
//!
//! [`CartStore`] is the exclusive owner of the cart: at most one entry per
//! product id, quantities always >= 1. All mutation goes through its
//! operations; checkout code only ever reads a snapshot via
//! [`CartStore::to_checkout_payload`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::ProductId;
use crate::wire::{CartEntry, CheckoutContact, CheckoutRequest};

/// Errors from local cart validation.
///
/// A failed mutation leaves the cart exactly as it was before the call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CartError {
    /// The mutation would leave an entry with a non-positive quantity.
    #[error("invalid quantity {resulting} for product {product_id}")]
    InvalidQuantity {
        /// Product whose entry was being adjusted.
        product_id: ProductId,
        /// Quantity the entry would have reached.
        resulting: i64,
    },
}

/// In-memory collection of (product, quantity) pairs prior to checkout.
///
/// Keyed by product id, so the at-most-one-entry-per-product invariant
/// holds by construction. Iteration order is ascending by product id,
/// which keeps checkout payloads deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    entries: BTreeMap<ProductId, u32>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Adjust the quantity for `product_id` by `delta`, inserting the entry
    /// if it does not exist yet.
    ///
    /// Returns the entry's new quantity. A negative `delta` decrements; the
    /// entry is never allowed to reach zero — remove it instead.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if the resulting quantity
    /// would be <= 0 (or would not fit a `u32`). The cart is unchanged on
    /// error.
    pub fn add(&mut self, product_id: ProductId, delta: i32) -> Result<u32, CartError> {
        let current = self.entries.get(&product_id).copied().unwrap_or(0);
        let resulting = i64::from(current) + i64::from(delta);

        let quantity = u32::try_from(resulting)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(CartError::InvalidQuantity {
                product_id,
                resulting,
            })?;

        self.entries.insert(product_id, quantity);
        Ok(quantity)
    }

    /// Remove the entry for `product_id`.
    ///
    /// Returns the removed quantity, or `None` if there was no entry.
    /// Removing an absent product is a no-op, not an error.
    pub fn remove(&mut self, product_id: ProductId) -> Option<u32> {
        self.entries.remove(&product_id)
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Quantity currently held for `product_id` (0 if absent).
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> u32 {
        self.entries.get(&product_id).copied().unwrap_or(0)
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the cart lines in ascending product-id order.
    pub fn entries(&self) -> impl Iterator<Item = CartEntry> + '_ {
        self.entries
            .iter()
            .map(|(&product_id, &quantity)| CartEntry {
                product_id,
                quantity,
            })
    }

    /// Produce a checkout submission body from the current cart plus the
    /// supplied contact fields.
    ///
    /// This is a synchronous, atomic snapshot: mutations made after this
    /// call do not affect the returned payload. The cart itself is not
    /// mutated.
    #[must_use]
    pub fn to_checkout_payload(&self, contact: &CheckoutContact) -> CheckoutRequest {
        CheckoutRequest {
            user_email: contact.email.as_str().to_owned(),
            items: self.entries().collect(),
            coupon_code: contact.coupon_code.clone(),
            address: contact.address.clone(),
            payment_token: contact.payment_token.clone(),
        }
    }
}
