//! Identity provider port and the in-process adapter.
//!
//! The provider owns credentials; ShopNow never sees a stored password.
//! [`MemoryAuthProvider`] stands in for it offline and in tests, hashing
//! passwords with Argon2id the same way a real credential store would.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use shopnow_core::{Email, UserId};

use super::AuthError;
use crate::models::Identity;
use crate::storage::KeyValueStore;

/// Provider id for Google sign-in.
pub const GOOGLE_PROVIDER_ID: &str = "google.com";

/// A token from a federated identity provider.
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// Provider id, e.g. [`GOOGLE_PROVIDER_ID`].
    pub provider_id: String,
    /// OpenID Connect id token issued by that provider.
    pub id_token: SecretString,
}

impl FederatedCredential {
    /// A Google credential.
    #[must_use]
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: GOOGLE_PROVIDER_ID.to_owned(),
            id_token: SecretString::from(id_token.into()),
        }
    }

    /// An unsigned credential accepted only by [`MemoryAuthProvider`].
    ///
    /// The token is the JSON claims object itself, the same convention the
    /// provider's local emulator uses.
    #[must_use]
    pub fn unsigned(email: &Email, name: Option<&str>) -> Self {
        let claims = UnsignedClaims {
            email: email.as_str().to_owned(),
            name: name.map(str::to_owned),
            picture: None,
        };
        // Serializing a struct of strings cannot fail.
        let token = serde_json::to_string(&claims).unwrap_or_default();
        Self::google(token)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UnsignedClaims {
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
}

/// Port over the hosted identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an email/password account and sign it in.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Identity, AuthError>;

    /// Sign in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError>;

    /// Sign in with a federated credential, creating the account on first use.
    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError>;
}

// =============================================================================
// In-process provider
// =============================================================================

/// Storage key for offline accounts.
pub const ACCOUNTS_STORAGE_KEY: &str = "shopnow-accounts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    uid: UserId,
    #[serde(default)]
    password_hash: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

type Accounts = BTreeMap<String, Account>;

/// Identity provider held in memory, keyed by email.
#[derive(Clone, Default)]
pub struct MemoryAuthProvider {
    accounts: Arc<Mutex<Accounts>>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider whose accounts survive restarts via `storage`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the account list cannot be read and
    /// `AuthError::Provider` if it is not valid.
    pub fn persisted(storage: Arc<dyn KeyValueStore>) -> Result<Self, AuthError> {
        let accounts = match storage.load(ACCOUNTS_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str::<Accounts>(&raw)
                .map_err(|e| AuthError::Provider(format!("invalid offline accounts: {e}")))?,
            None => Accounts::new(),
        };

        Ok(Self {
            accounts: Arc::new(Mutex::new(accounts)),
            storage: Some(storage),
        })
    }

    fn persist(&self, accounts: &Accounts) -> Result<(), AuthError> {
        if let Some(storage) = &self.storage {
            let raw = serde_json::to_string(accounts)
                .map_err(|e| AuthError::Provider(e.to_string()))?;
            storage.save(ACCOUNTS_STORAGE_KEY, &raw)?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn identity_for(email: &Email, account: &Account) -> Identity {
    Identity {
        uid: account.uid.clone(),
        email: email.clone(),
        display_name: account.display_name.clone(),
        photo_url: account.photo_url.clone(),
    }
}

/// Accounts are matched without regard to case, as the hosted provider does.
fn account_key(email: &Email) -> String {
    email.as_str().to_ascii_lowercase()
}

fn new_uid() -> UserId {
    UserId::new(Uuid::new_v4().simple().to_string())
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let password_hash = hash_password(password)?;

        let mut accounts = self.lock();
        let key = account_key(email);
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }

        let account = Account {
            uid: new_uid(),
            password_hash: Some(password_hash),
            display_name: None,
            photo_url: None,
        };
        let identity = identity_for(email, &account);
        accounts.insert(key, account);
        self.persist(&accounts)?;

        Ok(identity)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let account = self
            .lock()
            .get(&account_key(email))
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, hash)?;

        Ok(identity_for(email, &account))
    }

    #[instrument(skip(self, credential), fields(provider = %credential.provider_id))]
    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let claims: UnsignedClaims = serde_json::from_str(credential.id_token.expose_secret())
            .map_err(|e| AuthError::InvalidFederatedCredential(e.to_string()))?;
        let email = Email::parse(&claims.email)?;

        let mut accounts = self.lock();
        let account = accounts
            .entry(account_key(&email))
            .or_insert_with(|| Account {
                uid: new_uid(),
                password_hash: None,
                display_name: None,
                photo_url: None,
            });
        // Federated sign-in refreshes the provider-owned profile fields.
        if claims.name.is_some() {
            account.display_name = claims.name;
        }
        if claims.picture.is_some() {
            account.photo_url = claims.picture;
        }

        let identity = identity_for(&email, account);
        self.persist(&accounts)?;
        Ok(identity)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = MemoryAuthProvider::new();
        let created = provider
            .sign_up(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();

        let signed_in = provider
            .sign_in_with_password(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();
        assert_eq!(signed_in, created);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up() {
        let provider = MemoryAuthProvider::new();
        provider
            .sign_up(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();
        let again = provider
            .sign_up(&email("ana@example.com"), "outra123")
            .await;
        assert!(matches!(again, Err(AuthError::EmailInUse)));
    }

    #[tokio::test]
    async fn test_email_case_does_not_split_accounts() {
        let provider = MemoryAuthProvider::new();
        let created = provider
            .sign_up(&email("Ana.Souza@example.com"), "segredo1")
            .await
            .unwrap();

        let signed_in = provider
            .sign_in_with_password(&email("ana.souza@EXAMPLE.com"), "segredo1")
            .await
            .unwrap();
        assert_eq!(signed_in.uid, created.uid);

        let again = provider
            .sign_up(&email("ANA.SOUZA@example.com"), "outra123")
            .await;
        assert!(matches!(again, Err(AuthError::EmailInUse)));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_account() {
        let provider = MemoryAuthProvider::new();
        provider
            .sign_up(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();

        assert!(matches!(
            provider
                .sign_in_with_password(&email("ana@example.com"), "errada")
                .await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            provider
                .sign_in_with_password(&email("bia@example.com"), "segredo1")
                .await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_federated_reuses_account() {
        let provider = MemoryAuthProvider::new();
        let credential = FederatedCredential::unsigned(&email("caio@gmail.com"), Some("Caio"));

        let first = provider.sign_in_federated(&credential).await.unwrap();
        let second = provider.sign_in_federated(&credential).await.unwrap();
        assert_eq!(first.uid, second.uid);
        assert_eq!(first.display_name.as_deref(), Some("Caio"));

        // No password was ever set for this account.
        assert!(matches!(
            provider
                .sign_in_with_password(&email("caio@gmail.com"), "qualquer")
                .await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_federated_rejects_opaque_token() {
        let provider = MemoryAuthProvider::new();
        let result = provider
            .sign_in_federated(&FederatedCredential::google("eyJhbGciOi.not-json"))
            .await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidFederatedCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_persisted_accounts_survive_restart() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let first = MemoryAuthProvider::persisted(Arc::clone(&storage)).unwrap();
        let created = first
            .sign_up(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();

        let second = MemoryAuthProvider::persisted(storage).unwrap();
        let signed_in = second
            .sign_in_with_password(&email("ana@example.com"), "segredo1")
            .await
            .unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }
}
