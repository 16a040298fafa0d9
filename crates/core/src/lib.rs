//! Sandbar Core - Shared types library.
//!
//! This crate provides common types used across all Sandbar components:
//! - `client` - API access layer for the catalog/checkout service
//! - `cli` - Command-line demo surface
//!
//! # Architecture
//!
//! The core crate contains only types and in-memory state - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`wire`] - Request/response shapes of the remote catalog/checkout service
//! - [`cart`] - The client-side cart store
//! - [`trace`] - Bounded log of recent correlation ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod trace;
pub mod types;
pub mod wire;

pub use cart::{CartError, CartStore};
pub use trace::TraceLog;
pub use types::*;
pub use wire::{CartEntry, CheckoutContact, CheckoutRequest, CheckoutResponse, Product};
