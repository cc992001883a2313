//! Display Identity
//!
//! Every chat participant carries a display name and two-letter initials,
//! stored once in their profile document and read back on each session.
//!
//! ## Naming rules for a first session
//!
//! - Anonymous principals get a generated pseudonym ("Hopeful Star")
//! - Others use the provider display name, else the local part of their
//!   email address, else a generated pseudonym

mod pseudonym;

pub use pseudonym::{generate_pseudonym, initials, pseudonym_from_seed, ADJECTIVES, NOUNS};

use serde::{Deserialize, Serialize};

use crate::store::{Principal, ProfileStore, StoreResult, UserId, UserProfile};

/// The resolved display identity of a session's user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
    pub initials: String,
    pub is_anonymous: bool,
}

impl Identity {
    fn from_profile(profile: &UserProfile) -> Self {
        let display_name = non_empty(&profile.display_name)
            .map(str::to_string)
            .unwrap_or_else(generate_pseudonym);
        let label = non_empty(&profile.initials)
            .map(str::to_string)
            .unwrap_or_else(|| initials(&display_name));

        Self {
            user_id: profile.user_id.clone(),
            display_name,
            initials: label,
            is_anonymous: profile.is_anonymous,
        }
    }

    fn to_profile(&self, email: Option<String>) -> UserProfile {
        UserProfile {
            user_id: self.user_id.clone(),
            email,
            display_name: self.display_name.clone(),
            initials: self.initials.clone(),
            is_anonymous: self.is_anonymous,
            created_at: None,
            last_activity: None,
        }
    }
}

/// Display name for a principal without a profile
pub fn choose_display_name(principal: &Principal) -> String {
    if principal.is_anonymous {
        return generate_pseudonym();
    }

    principal
        .display_name
        .as_deref()
        .and_then(non_empty)
        .or_else(|| {
            principal
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .and_then(non_empty)
        })
        .map(str::to_string)
        .unwrap_or_else(generate_pseudonym)
}

/// Read the principal's profile, creating it on first use
pub async fn resolve_identity(
    profiles: &dyn ProfileStore,
    principal: &Principal,
) -> StoreResult<Identity> {
    if let Some(profile) = profiles.get_profile(&principal.uid).await? {
        return Ok(Identity::from_profile(&profile));
    }

    let display_name = choose_display_name(principal);
    let identity = Identity {
        user_id: principal.uid.clone(),
        initials: initials(&display_name),
        display_name,
        is_anonymous: principal.is_anonymous,
    };

    profiles
        .create_profile(identity.to_profile(principal.email.clone()))
        .await?;

    tracing::info!(
        user_id = %identity.user_id,
        display_name = %identity.display_name,
        anonymous = identity.is_anonymous,
        "Created user profile"
    );

    Ok(identity)
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_display_name_preference() {
        let named = Principal::with_password("u1", "jane.doe@example.com", true)
            .display_name("Jane Doe");
        assert_eq!(choose_display_name(&named), "Jane Doe");

        let email_only = Principal::with_password("u2", "jane.doe@example.com", true);
        assert_eq!(choose_display_name(&email_only), "jane.doe");

        let blank = Principal::with_password("u3", "@example.com", true).display_name("  ");
        let name = choose_display_name(&blank);
        assert_eq!(name.split(' ').count(), 2);
    }

    #[test]
    fn test_anonymous_ignores_provider_name() {
        let anon = Principal::anonymous("u1").display_name("Should Not Use");
        let name = choose_display_name(&anon);
        let words: Vec<&str> = name.split(' ').collect();
        assert!(ADJECTIVES.contains(&words[0]));
        assert!(NOUNS.contains(&words[1]));
    }

    #[tokio::test]
    async fn test_first_use_creates_profile_once() {
        let store = MemoryStore::default();
        let principal = Principal::anonymous("anon-1");

        let first = resolve_identity(&store, &principal).await.unwrap();
        let second = resolve_identity(&store, &principal).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.profile_writes(), 1);
        assert!(first.is_anonymous);

        let words: Vec<&str> = first.display_name.split(' ').collect();
        let expected: String = words.iter().map(|w| &w[..1]).collect::<String>().to_uppercase();
        assert_eq!(first.initials, expected);
    }

    #[tokio::test]
    async fn test_existing_profile_with_blank_fields() {
        let store = MemoryStore::default();
        store
            .create_profile(UserProfile {
                user_id: "u1".to_string(),
                email: None,
                display_name: "Quiet Moon".to_string(),
                initials: String::new(),
                is_anonymous: false,
                created_at: None,
                last_activity: None,
            })
            .await
            .unwrap();

        let identity = resolve_identity(&store, &Principal::with_password("u1", "a@b.c", true))
            .await
            .unwrap();
        assert_eq!(identity.display_name, "Quiet Moon");
        assert_eq!(identity.initials, "QM");
        assert_eq!(store.profile_writes(), 1);
    }
}
