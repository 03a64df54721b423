//! Document database access.
//!
//! # Layout
//!
//! The hosted database is a schema-less JSON tree. ShopNow uses two
//! collections:
//!
//! - `products/{id}` - catalog entries
//! - `users/{uid}` - profile mirrored from the identity provider
//!
//! There are no migrations and no versioning; records are whatever the last
//! writer put there.
//!
//! # Adapters
//!
//! [`DocumentStore`] is the port. Two adapters implement it:
//!
//! - [`MemoryDocumentStore`] - in-process tree, optionally snapshotted to a
//!   [`KeyValueStore`](crate::storage::KeyValueStore) for offline use
//! - [`RealtimeDatabase`] - REST client for the hosted realtime database
//!
//! Repositories ([`ProductRepository`], [`ProfileRepository`]) sit on top of
//! the port and own the mapping between documents and domain types.

pub mod memory;
pub mod products;
pub mod realtime;
pub mod users;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryDocumentStore;
pub use products::ProductRepository;
pub use realtime::RealtimeDatabase;
pub use users::ProfileRepository;

/// A stored document.
pub type Document = serde_json::Value;

/// Errors that can occur in database operations.
///
/// Every failure is terminal for the current action; nothing is retried.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The provider rejected the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// Transport failure talking to the provider.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data does not match the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document does not exist.
    #[error("not found")]
    NotFound,

    /// Key cannot be used as a path segment.
    #[error("invalid document key: {0:?}")]
    InvalidKey(String),

    /// Offline snapshot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Port over a keyed, schema-less document collection.
///
/// Reads return documents in whatever order the provider yields them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Allocate a fresh key in `collection` without writing anything.
    fn allocate_key(&self, collection: &str) -> String;

    /// Read a single document.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, RepositoryError>;

    /// Overwrite a document (full replace, not a merge).
    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: &Document,
    ) -> Result<(), RepositoryError>;

    /// Delete a document. Deleting a missing key succeeds.
    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError>;

    /// Read every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, RepositoryError>;

    /// Read the documents whose `field` equals `value`, filtered by the provider.
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Document,
    ) -> Result<Vec<(String, Document)>, RepositoryError>;
}

/// Generate a time-ordered key, the way the provider's client SDK does
/// before the first write.
#[must_use]
pub fn new_document_key() -> String {
    format!("-{}", Uuid::now_v7().simple())
}

/// Reject keys the provider would interpret as path syntax.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidKey` for empty keys or keys containing
/// `/ . # $ [ ]` or control characters.
pub fn validate_key(key: &str) -> Result<(), RepositoryError> {
    let forbidden = |c: char| matches!(c, '/' | '.' | '#' | '$' | '[' | ']') || c.is_control();
    if key.is_empty() || key.chars().any(forbidden) {
        return Err(RepositoryError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
