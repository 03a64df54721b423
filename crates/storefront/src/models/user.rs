//! User identity and profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopnow_core::{Email, UserId};

use super::optional;

/// The signed-in principal, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider subject id. Also the key of the profile document.
    pub uid: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Profile stored under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Document key; not part of the stored body.
    #[serde(default, skip_serializing)]
    pub id: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Profile written at password sign-up.
    #[must_use]
    pub fn for_sign_up(identity: &Identity, details: ProfileDetails, now: DateTime<Utc>) -> Self {
        let details = details.normalized();
        Self {
            id: identity.uid.clone(),
            email: identity.email.clone(),
            name: details.name,
            address: details.address,
            city: details.city,
            phone: details.phone,
            photo_url: None,
            created_at: Some(now),
            updated_at: None,
        }
    }

    /// Minimal profile written on the first federated sign-in.
    #[must_use]
    pub fn for_federated(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            id: identity.uid.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            address: None,
            city: None,
            phone: None,
            photo_url: identity.photo_url.clone(),
            created_at: Some(now),
            updated_at: None,
        }
    }

    /// Replacement profile for an update.
    ///
    /// This is a full overwrite: the email comes from the identity and
    /// everything not in `details` (photo, creation time) is dropped.
    #[must_use]
    pub fn for_update(identity: &Identity, details: ProfileDetails, now: DateTime<Utc>) -> Self {
        let details = details.normalized();
        Self {
            id: identity.uid.clone(),
            email: identity.email.clone(),
            name: details.name,
            address: details.address,
            city: details.city,
            phone: details.phone,
            photo_url: None,
            created_at: None,
            updated_at: Some(now),
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

impl ProfileDetails {
    /// Trim every field and turn blanks into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: optional(self.name.as_deref()),
            address: optional(self.address.as_deref()),
            city: optional(self.city.as_deref()),
            phone: optional(self.phone.as_deref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn identity() -> Identity {
        Identity {
            uid: UserId::new("uid-1"),
            email: Email::parse("ana@example.com").unwrap(),
            display_name: Some("Ana".to_owned()),
            photo_url: Some("https://img.example.com/ana.png".to_owned()),
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_sign_up_document() {
        let details = ProfileDetails {
            name: Some(" Ana Souza ".to_owned()),
            city: Some("Recife".to_owned()),
            phone: Some(String::new()),
            address: None,
        };
        let doc = serde_json::to_value(UserProfile::for_sign_up(&identity(), details, now()))
            .unwrap();
        assert_eq!(
            doc,
            json!({
                "email": "ana@example.com",
                "name": "Ana Souza",
                "city": "Recife",
                "createdAt": "2025-03-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_federated_document_uses_photo_url_key() {
        let doc = serde_json::to_value(UserProfile::for_federated(&identity(), now())).unwrap();
        assert_eq!(doc["photoURL"], "https://img.example.com/ana.png");
        assert_eq!(doc["name"], "Ana");
        assert!(doc.get("id").is_none());
    }

    #[test]
    fn test_update_overwrites_everything_but_email() {
        let profile = UserProfile::for_update(
            &identity(),
            ProfileDetails {
                name: Some("Ana S.".to_owned()),
                ..ProfileDetails::default()
            },
            now(),
        );
        assert_eq!(profile.email.as_str(), "ana@example.com");
        assert_eq!(profile.photo_url, None);
        assert_eq!(profile.created_at, None);
        assert_eq!(profile.updated_at, Some(now()));
    }
}
