//! Unified error handling.
//!
//! Provides a unified `AppError` type for the presentation layer. Each
//! variant maps to a message that is safe to show to the buyer; provider and
//! storage details only go to the log.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::auth::AuthError;
use crate::services::checkout::{CheckoutError, PaymentError};
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Form input was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bad request from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this is a fault on our side (or the provider's) rather than
    /// something the user can fix.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Database(err) => !matches!(err, RepositoryError::NotFound),
            Self::Storage(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::Provider(_)
                    | AuthError::Http(_)
                    | AuthError::Repository(_)
                    | AuthError::Storage(_)
                    | AuthError::PasswordHash
            ),
            Self::Checkout(_)
            | Self::Validation(_)
            | Self::Config(_)
            | Self::BadRequest(_) => false,
        }
    }

    /// Message for the user. Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(_) | Self::Storage(_) => {
                "Something went wrong, please try again".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::EmailInUse => "An account with this email already exists".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::NotSignedIn => "Please sign in first".to_string(),
                AuthError::InvalidFederatedCredential(_) => {
                    "Could not sign in with that account".to_string()
                }
                _ => "Authentication error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Payment(PaymentError::Declined(_)) => {
                    "Payment failed, please try again".to_string()
                }
                other => other.to_string(),
            },
            Self::Validation(err) => err.to_string(),
            Self::Config(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
