//! Sandbar Client - API access layer for the catalog/checkout service.
//!
//! # Architecture
//!
//! - [`Settings`] is an explicitly injected handle to the runtime-mutable
//!   client configuration (base URL, API version, scenario tag). The
//!   developer-settings surface writes through it; [`ApiClient`] reads a
//!   fresh snapshot on every call and never caches it.
//! - [`ApiClient`] performs plain JSON-over-HTTP against the configured
//!   base URL. Every call records exactly one correlation id, preferring
//!   the response body's `trace_id` and falling back to the generated
//!   request id.
//! - [`CheckoutFlow`] drives a single checkout attempt. It never mutates
//!   the cart; clearing on success is an explicit follow-up the caller
//!   applies via [`CheckoutOutcome::settle`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sandbar_client::{ApiClient, CheckoutFlow, Settings};
//! use sandbar_core::{CartStore, CheckoutContact, Email};
//!
//! let settings = Settings::from_env()?;
//! let client = ApiClient::new(settings);
//!
//! let mut cart = CartStore::new();
//! cart.add(product.id, 1)?;
//!
//! let contact = CheckoutContact::from_email(Email::parse("shopper@example.com")?);
//! let outcome = CheckoutFlow::new().submit(&client, &cart, &contact).await;
//! outcome.settle(&mut cart);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod api;
mod checkout;
mod config;
mod error;

pub use api::ApiClient;
pub use checkout::{CheckoutFlow, CheckoutOutcome, CheckoutState};
pub use config::{ApiVersion, ClientConfig, ConfigError, InvalidApiVersion, Settings};
pub use error::ClientError;
