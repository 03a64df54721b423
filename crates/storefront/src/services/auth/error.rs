//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shopnow_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("email already in use")]
    EmailInUse,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The federated credential could not be used.
    #[error("invalid federated credential: {0}")]
    InvalidFederatedCredential(String),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The identity provider rejected the request.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Transport failure talking to the identity provider.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Profile read or write failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Offline account store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
