//! ShopNow storefront library.
//!
//! Catalog, cart, checkout and auth services over a hosted document
//! database and identity provider, with in-process adapters for offline use
//! and tests. The presentation layer lives in the `shopnow` CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
