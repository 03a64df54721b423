//! Domain models for the storefront.
//!
//! Stored shapes follow the hosted database's camelCase documents; form
//! types hold raw user input until [`ValidationError`]-checked.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

use thiserror::Error;

pub use cart::{Cart, CartLine};
pub use order::{CustomerDetails, OrderSummary};
pub use product::{Product, ProductData, ProductForm};
pub use user::{Identity, ProfileDetails, UserProfile};

/// A form field failed validation.
///
/// Raised before anything is sent to the provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{field} is required")]
    Required {
        /// Human-readable field name.
        field: &'static str,
    },

    /// A field has a value that cannot be accepted.
    #[error("{field}: {reason}")]
    Invalid {
        /// Human-readable field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Trim `value` and fail with `Required` if nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Trim `value`, mapping blank input to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
