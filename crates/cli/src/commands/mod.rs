//! Command handlers. Each module is one "page" of the storefront.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
