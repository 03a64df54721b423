//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - sign-up, password and federated sign-in, profile, session
//! - `cart` - shared cart persisted to local storage
//! - `catalog` - dashboard stats, featured list, admin filter
//! - `checkout` - entry guards, simulated payment, order summary

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
