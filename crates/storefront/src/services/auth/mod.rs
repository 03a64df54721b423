//! Authentication service.
//!
//! Wraps the identity provider and the profile collection: sign-up writes a
//! profile next to the new account, federated sign-in creates one only the
//! first time, and every successful sign-in or sign-out is published through
//! [`SessionState`].

mod error;
pub mod identity_toolkit;
pub mod provider;
pub mod session;

pub use error::AuthError;
pub use identity_toolkit::IdentityToolkit;
pub use provider::{AuthProvider, FederatedCredential, MemoryAuthProvider};
pub use session::{AuthState, SessionState, Subscription};

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use shopnow_core::Email;

use crate::db::ProfileRepository;
use crate::models::{Identity, ProfileDetails, UserProfile};

/// Minimum password length accepted by the provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    profiles: ProfileRepository,
    session: SessionState,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        profiles: ProfileRepository,
        session: SessionState,
    ) -> Self {
        Self {
            provider,
            profiles,
            session,
        }
    }

    /// The session holder this service publishes to.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// The signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    pub fn require_identity(&self) -> Result<Identity, AuthError> {
        self.current_identity().ok_or(AuthError::NotSignedIn)
    }

    /// Register with email and password and write the profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::EmailInUse` if the email is already registered.
    /// Returns `AuthError::Repository` if the profile cannot be written; the
    /// account exists at that point and the user stays signed out.
    #[instrument(skip(self, password, details))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: ProfileDetails,
    ) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let identity = self.provider.sign_up(&email, password).await?;
        let profile = UserProfile::for_sign_up(&identity, details, Utc::now());
        self.profiles.put(&profile).await?;

        tracing::info!(uid = %identity.uid, "account created");
        self.session.sign_in(identity.clone());
        Ok(identity)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        let identity = self.provider.sign_in_with_password(&email, password).await?;

        tracing::info!(uid = %identity.uid, "signed in");
        self.session.sign_in(identity.clone());
        Ok(identity)
    }

    /// Sign in with a federated credential.
    ///
    /// Writes a minimal profile the first time this account is seen; an
    /// existing profile is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidFederatedCredential` if the provider rejects
    /// the token, or `AuthError::Repository` if the profile lookup or write
    /// fails.
    #[instrument(skip(self, credential))]
    pub async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in_federated(credential).await?;

        if self.profiles.get(&identity.uid).await?.is_none() {
            let profile = UserProfile::for_federated(&identity, Utc::now());
            self.profiles.put(&profile).await?;
            tracing::info!(uid = %identity.uid, "profile created on first federated sign-in");
        }

        tracing::info!(uid = %identity.uid, "signed in (federated)");
        self.session.sign_in(identity.clone());
        Ok(identity)
    }

    /// Sign out. Signing out while signed out is a no-op.
    pub fn sign_out(&self) {
        if let Some(identity) = self.current_identity() {
            tracing::info!(uid = %identity.uid, "signed out");
        }
        self.session.sign_out();
    }

    /// The signed-in user's stored profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    /// Returns `AuthError::Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Option<UserProfile>, AuthError> {
        let identity = self.require_identity()?;
        Ok(self.profiles.get(&identity.uid).await?)
    }

    /// Overwrite the signed-in user's profile.
    ///
    /// The stored email always comes from the identity and `updatedAt` is
    /// stamped. Fields missing from `details` are erased.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` if nobody is signed in.
    /// Returns `AuthError::Repository` if the write fails.
    #[instrument(skip(self, details))]
    pub async fn update_profile(&self, details: ProfileDetails) -> Result<UserProfile, AuthError> {
        let identity = self.require_identity()?;
        let profile = UserProfile::for_update(&identity, details, Utc::now());
        self.profiles.put(&profile).await?;
        Ok(profile)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;

    fn service() -> AuthService {
        let store = Arc::new(MemoryDocumentStore::new());
        let session = SessionState::new();
        session.resolve();
        AuthService::new(
            Arc::new(MemoryAuthProvider::new()),
            ProfileRepository::new(store),
            session,
        )
    }

    fn details() -> ProfileDetails {
        ProfileDetails {
            name: Some("Ana Souza".to_owned()),
            address: Some("Rua das Flores, 10".to_owned()),
            city: Some("Recife".to_owned()),
            phone: Some("81 99999-0000".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_sign_up_writes_profile_and_signs_in() {
        let auth = service();
        let identity = auth
            .sign_up("ana@example.com", "segredo1", details())
            .await
            .unwrap();

        assert_eq!(auth.current_identity(), Some(identity.clone()));
        let profile = auth.profile().await.unwrap().unwrap();
        assert_eq!(profile.id, identity.uid);
        assert_eq!(profile.city.as_deref(), Some("Recife"));
        assert!(profile.created_at.is_some());
    }

    #[tokio::test]
    async fn test_sign_up_validation_never_reaches_provider() {
        let auth = service();
        assert!(matches!(
            auth.sign_up("not-an-email", "segredo1", details()).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.sign_up("ana@example.com", "12345", details()).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert_eq!(auth.session().current(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_out_then_sign_in() {
        let auth = service();
        auth.sign_up("ana@example.com", "segredo1", details())
            .await
            .unwrap();
        auth.sign_out();
        assert_eq!(auth.current_identity(), None);
        assert!(matches!(auth.profile().await, Err(AuthError::NotSignedIn)));

        assert!(matches!(
            auth.sign_in("ana@example.com", "errada").await,
            Err(AuthError::InvalidCredentials)
        ));
        auth.sign_in("ana@example.com", "segredo1").await.unwrap();
        assert!(auth.current_identity().is_some());
    }

    #[tokio::test]
    async fn test_federated_creates_profile_once() {
        let auth = service();
        let email = Email::parse("caio@gmail.com").unwrap();
        let credential = FederatedCredential::unsigned(&email, Some("Caio"));

        auth.sign_in_federated(&credential).await.unwrap();
        let first = auth.profile().await.unwrap().unwrap();
        assert_eq!(first.name.as_deref(), Some("Caio"));

        auth.update_profile(ProfileDetails {
            name: Some("Caio Lima".to_owned()),
            city: Some("Natal".to_owned()),
            ..ProfileDetails::default()
        })
        .await
        .unwrap();

        auth.sign_out();
        auth.sign_in_federated(&credential).await.unwrap();
        let second = auth.profile().await.unwrap().unwrap();
        assert_eq!(second.name.as_deref(), Some("Caio Lima"));
        assert_eq!(second.city.as_deref(), Some("Natal"));
    }

    #[tokio::test]
    async fn test_update_profile_requires_sign_in_and_keeps_email() {
        let auth = service();
        assert!(matches!(
            auth.update_profile(details()).await,
            Err(AuthError::NotSignedIn)
        ));

        auth.sign_up("ana@example.com", "segredo1", details())
            .await
            .unwrap();
        let updated = auth
            .update_profile(ProfileDetails {
                phone: Some("81 3333-0000".to_owned()),
                ..ProfileDetails::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.email.as_str(), "ana@example.com");
        assert_eq!(updated.name, None);
        assert!(updated.updated_at.is_some());
        assert_eq!(auth.profile().await.unwrap(), Some(updated));
    }
}
