//! ShopNow Core - Shared types library.
//!
//! This crate provides common types used across all ShopNow components:
//! - `storefront` - Catalog, cart, checkout and auth services
//! - `cli` - Terminal front end composing the storefront services
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no provider access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document keys, prices, emails,
//!   categories and stock levels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
