//! Profile repository over the `users` collection.

use std::sync::Arc;

use tracing::instrument;

use shopnow_core::UserId;

use super::{DocumentStore, RepositoryError};
use crate::models::UserProfile;

const COLLECTION: &str = "users";

/// Repository for user profiles, keyed by provider subject id.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get the profile for `uid`, if one was ever written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is
    /// not a profile.
    #[instrument(skip(self))]
    pub async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let Some(doc) = self.store.get(COLLECTION, uid.as_str()).await? else {
            return Ok(None);
        };

        let mut profile: UserProfile = serde_json::from_value(doc).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid profile {uid}: {e}"))
        })?;
        profile.id = uid.clone();
        Ok(Some(profile))
    }

    /// Overwrite the profile stored under `profile.id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self, profile), fields(uid = %profile.id))]
    pub async fn put(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let doc = serde_json::to_value(profile)?;
        self.store.set(COLLECTION, profile.id.as_str(), &doc).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use shopnow_core::Email;

    use super::*;
    use crate::db::MemoryDocumentStore;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryDocumentStore::new();
        let repo = ProfileRepository::new(Arc::new(store.clone()));
        let uid = UserId::new("uid-7");

        assert!(repo.get(&uid).await.unwrap().is_none());

        let profile = UserProfile {
            id: uid.clone(),
            email: Email::parse("joao@example.com").unwrap(),
            name: Some("João".to_owned()),
            address: None,
            city: Some("Natal".to_owned()),
            phone: None,
            photo_url: None,
            created_at: None,
            updated_at: None,
        };
        repo.put(&profile).await.unwrap();

        assert_eq!(repo.get(&uid).await.unwrap(), Some(profile));
        assert_eq!(
            store.get("users", "uid-7").await.unwrap(),
            Some(json!({"email": "joao@example.com", "name": "João", "city": "Natal"}))
        );
    }

    #[tokio::test]
    async fn test_corrupt_profile() {
        let store = MemoryDocumentStore::new();
        store
            .set("users", "uid-1", &json!({"name": "no email"}))
            .await
            .unwrap();

        let repo = ProfileRepository::new(Arc::new(store));
        assert!(matches!(
            repo.get(&UserId::new("uid-1")).await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
