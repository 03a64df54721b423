//! REST adapter for the hosted identity provider.
//!
//! Uses the `accounts:*` endpoints with the project API key as the `key`
//! query parameter. Errors come back as
//! `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`; the message code is
//! mapped onto [`AuthError`].

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopnow_core::{Email, UserId};

use super::AuthError;
use super::provider::{AuthProvider, FederatedCredential};
use crate::models::Identity;

/// Default endpoint of the hosted identity provider.
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Client for the identity provider REST API.
#[derive(Clone)]
pub struct IdentityToolkit {
    inner: Arc<IdentityToolkitInner>,
}

struct IdentityToolkitInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityToolkit {
    /// Create a client for `base_url` (usually [`DEFAULT_AUTH_URL`]).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, AuthError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AuthError::Provider(format!("invalid auth URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuthError::Provider(format!(
                "auth URL must be http(s): {base_url}"
            )));
        }

        Ok(Self {
            inner: Arc::new(IdentityToolkitInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_owned(),
                api_key,
            }),
        })
    }

    /// `{base}/accounts:{method}?key=...`.
    ///
    /// Built by hand: `Url::join` would read `accounts:` as a scheme.
    fn endpoint(&self, method: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}/accounts:{method}", self.inner.base_url))
            .map_err(|e| AuthError::Provider(format!("invalid auth endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, AuthError> {
        let url = self.endpoint(method)?;
        debug!(method, "identity provider request");

        let response = self.inner.client.post(url).json(body).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&response_text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::error!(
                status = %status,
                code = %code,
                "Identity provider returned non-success status"
            );
            return Err(map_error_code(&code));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse identity provider response");
            AuthError::Provider(format!("unexpected response: {e}"))
        })
    }
}

/// Map a provider error code onto [`AuthError`].
///
/// Codes may carry detail after a colon, e.g.
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_error_code(code: &str) -> AuthError {
    let (head, detail) = code
        .split_once(':')
        .map_or((code, ""), |(h, d)| (h.trim(), d.trim()));

    match head {
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        "INVALID_EMAIL" => AuthError::InvalidEmail(shopnow_core::EmailError::InvalidDomain),
        "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
            head.to_owned()
        } else {
            detail.to_owned()
        }),
        "INVALID_IDP_RESPONSE" | "INVALID_ID_TOKEN" => {
            AuthError::InvalidFederatedCredential(code.to_owned())
        }
        _ => AuthError::Provider(code.to_owned()),
    }
}

impl AccountResponse {
    fn into_identity(self) -> Result<Identity, AuthError> {
        Ok(Identity {
            uid: UserId::new(self.local_id),
            email: Email::parse(&self.email)?,
            display_name: self.display_name,
            photo_url: self.photo_url,
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkit {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let body = PasswordRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        self.call::<_, AccountResponse>("signUp", &body)
            .await?
            .into_identity()
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let body = PasswordRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        self.call::<_, AccountResponse>("signInWithPassword", &body)
            .await?
            .into_identity()
    }

    #[instrument(skip(self, credential), fields(provider = %credential.provider_id))]
    async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AuthError> {
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", credential.id_token.expose_secret())
            .append_pair("providerId", &credential.provider_id)
            .finish();
        let body = IdpRequest {
            post_body,
            request_uri: "http://localhost",
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.call::<_, AccountResponse>("signInWithIdp", &body)
            .await?
            .into_identity()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_colon_method() {
        let client = IdentityToolkit::new(
            "https://identitytoolkit.googleapis.com/v1/",
            SecretString::from("AIzaTestKey"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("signUp").unwrap().as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=AIzaTestKey"
        );
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(IdentityToolkit::new("file:///tmp", SecretString::from("k")).is_err());
    }

    #[test]
    fn test_map_error_code() {
        assert!(matches!(map_error_code("EMAIL_EXISTS"), AuthError::EmailInUse));
        assert!(matches!(
            map_error_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        match map_error_code("WEAK_PASSWORD : Password should be at least 6 characters") {
            AuthError::WeakPassword(msg) => {
                assert_eq!(msg, "Password should be at least 6 characters");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Provider(_)
        ));
    }
}
