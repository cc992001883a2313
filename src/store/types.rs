//! Documents exchanged with the auth and document-store backend
//!
//! - `Principal`: an authenticated user as reported by the auth provider
//! - `UserProfile`: the persisted per-user profile record
//! - `Message` / `NewMessage`: chat-room message documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, stable id of an authenticated principal
pub type UserId = String;

/// Chat room identifier
pub type RoomId = String;

/// Message document id, assigned by the store
pub type MessageId = String;

/// Sign-in method attached to a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignInProvider {
    Password,
    Google,
    Anonymous,
    Other(String),
}

impl From<String> for SignInProvider {
    fn from(id: String) -> Self {
        match id.as_str() {
            "password" => SignInProvider::Password,
            "google.com" => SignInProvider::Google,
            "anonymous" => SignInProvider::Anonymous,
            _ => SignInProvider::Other(id),
        }
    }
}

impl From<SignInProvider> for String {
    fn from(provider: SignInProvider) -> Self {
        match provider {
            SignInProvider::Password => "password".to_string(),
            SignInProvider::Google => "google.com".to_string(),
            SignInProvider::Anonymous => "anonymous".to_string(),
            SignInProvider::Other(id) => id,
        }
    }
}

/// An authenticated user as resolved by the auth backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: UserId,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub providers: Vec<SignInProvider>,
}

impl Principal {
    /// An anonymous principal with no email or providers
    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: true,
            email_verified: false,
            email: None,
            display_name: None,
            providers: vec![SignInProvider::Anonymous],
        }
    }

    /// A principal signed in with email and password
    pub fn with_password(uid: impl Into<String>, email: impl Into<String>, verified: bool) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: false,
            email_verified: verified,
            email: Some(email.into()),
            display_name: None,
            providers: vec![SignInProvider::Password],
        }
    }

    /// Builder method: set the provider-supplied display name
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Builder method: replace the provider list
    pub fn providers(mut self, providers: Vec<SignInProvider>) -> Self {
        self.providers = providers;
        self
    }

    /// Whether the principal signed in with email and password
    pub fn uses_password(&self) -> bool {
        self.providers.contains(&SignInProvider::Password)
    }

    /// Whether the principal may enter protected pages.
    ///
    /// Only password sign-ins have to confirm their email address.
    pub fn is_cleared(&self) -> bool {
        !self.uses_password() || self.email_verified
    }
}

/// Persisted user profile, one per principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub initials: String,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Server-assigned creation time, `None` until acknowledged
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

/// A message as stored in a room's ordered collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub author_id: UserId,
    pub display_name: String,
    pub initials: String,
    pub text: String,
    /// Client clock at send time
    pub created_at: DateTime<Utc>,
    /// Authoritative ordering key, `None` until the server acknowledges
    #[serde(default)]
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Ordering key: server timestamp when resolved, else the client clock
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.server_timestamp.unwrap_or(self.created_at)
    }
}

/// A message about to be appended; the store assigns id and server timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub author_id: UserId,
    pub display_name: String,
    pub initials: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// Materialize the stored document
    pub fn into_message(self, id: MessageId, server_timestamp: Option<DateTime<Utc>>) -> Message {
        Message {
            id,
            author_id: self.author_id,
            display_name: self.display_name,
            initials: self.initials,
            text: self.text,
            created_at: self.created_at,
            server_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids() {
        assert_eq!(SignInProvider::from("password".to_string()), SignInProvider::Password);
        assert_eq!(SignInProvider::from("google.com".to_string()), SignInProvider::Google);
        assert_eq!(
            SignInProvider::from("github.com".to_string()),
            SignInProvider::Other("github.com".to_string())
        );
        assert_eq!(String::from(SignInProvider::Google), "google.com");
    }

    #[test]
    fn test_only_password_principals_need_verification() {
        assert!(!Principal::with_password("u1", "a@b.c", false).is_cleared());
        assert!(Principal::with_password("u1", "a@b.c", true).is_cleared());
        assert!(Principal::anonymous("u2").is_cleared());

        let google = Principal::with_password("u3", "g@b.c", false)
            .providers(vec![SignInProvider::Google]);
        assert!(google.is_cleared());
    }

    #[test]
    fn test_principal_deserialize() {
        let json = r#"{"uid":"abc","isAnonymous":false,"emailVerified":true,
            "email":"jane@example.com","providers":["password"]}"#;
        let principal: Principal = serde_json::from_str(json).unwrap();
        assert_eq!(principal.uid, "abc");
        assert!(principal.uses_password());
        assert!(principal.display_name.is_none());
    }

    #[test]
    fn test_sort_key_falls_back_to_created_at() {
        let created = Utc::now();
        let pending = NewMessage {
            author_id: "u1".to_string(),
            display_name: "Calm River".to_string(),
            initials: "CR".to_string(),
            text: "hi".to_string(),
            created_at: created,
        }
        .into_message("m1".to_string(), None);
        assert_eq!(pending.sort_key(), created);

        let acked = Message {
            server_timestamp: Some(created + chrono::Duration::seconds(2)),
            ..pending
        };
        assert_eq!(acked.sort_key(), created + chrono::Duration::seconds(2));
    }
}
