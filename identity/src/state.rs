//! Authentication state types.
//!
//! The [`User`] profile is owned by the identity platform; Lexicon only
//! ever reads it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier, stable per account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wrap a provider-issued identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user profile snapshot.
///
/// # Examples
///
/// ```
/// # use lexicon_identity::User;
/// let user = User::new("u1").with_display_name("Ann").with_email("ann@example.com");
/// assert_eq!(user.display_name.as_deref(), Some("Ann"));
/// assert!(!user.is_anonymous);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-issued identifier.
    pub id: UserId,

    /// Display name, if the provider has one.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Email address, if shared.
    #[serde(default)]
    pub email: Option<String>,

    /// Avatar URL.
    #[serde(default)]
    pub photo_url: Option<String>,

    /// Whether the provider verified the email.
    #[serde(default)]
    pub email_verified: bool,

    /// Anonymous (guest) account.
    #[serde(default)]
    pub is_anonymous: bool,
}

impl User {
    /// Minimal profile with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            display_name: None,
            email: None,
            photo_url: None,
            email_verified: false,
            is_anonymous: false,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the avatar URL.
    #[must_use]
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Mark the email verified (or not).
    #[must_use]
    pub const fn verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    /// Mark the account anonymous.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }
}

/// Current authentication state: nobody, or a specific user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    /// No signed-in user.
    #[default]
    SignedOut,

    /// A signed-in user.
    SignedIn(User),
}

impl AuthState {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(user) => Some(user),
        }
    }

    /// Consume into the signed-in user, if any.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(user) => Some(user),
        }
    }

    /// Returns `true` when a user is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

impl From<Option<User>> for AuthState {
    fn from(user: Option<User>) -> Self {
        user.map_or(Self::SignedOut, Self::SignedIn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_signed_out() {
        let state = AuthState::default();
        assert!(!state.is_signed_in());
        assert!(state.user().is_none());
    }

    #[test]
    fn test_from_option() {
        let state = AuthState::from(Some(User::new("u1")));
        assert_eq!(state.user().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(AuthState::from(None), AuthState::SignedOut);
    }

    #[test]
    fn test_user_deserializes_provider_payload() {
        let user: User = serde_json::from_str(
            r#"{"id":"abc","displayName":"Ann","email":"ann@example.com","emailVerified":true}"#,
        )
        .unwrap();

        assert_eq!(user.id, UserId::new("abc"));
        assert_eq!(user.display_name.as_deref(), Some("Ann"));
        assert!(user.email_verified);
        assert!(user.photo_url.is_none());
        assert!(!user.is_anonymous);
    }

    #[test]
    fn test_auth_state_serialization_is_tagged() {
        let json = serde_json::to_value(AuthState::SignedIn(User::new("u1"))).unwrap();
        assert_eq!(json["status"], "signed_in");
        assert_eq!(json["user"]["id"], "u1");

        let json = serde_json::to_value(AuthState::SignedOut).unwrap();
        assert_eq!(json["status"], "signed_out");
    }
}
