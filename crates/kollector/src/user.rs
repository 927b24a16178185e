//! Who is signed in. The repository needs a user id only to scope remote
//! fetches; where profiles are persisted (keychain, backend) is not its concern.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<Vec<u8>>,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }
}

/// Supplies the current authenticated user, if any.
pub trait UserContextProvider: Send + Sync {
    fn current_user(&self) -> Option<UserProfile>;

    /// Id used to scope remote fetches. Blank uids count as signed out.
    fn current_user_id(&self) -> Option<String> {
        self.current_user()
            .map(|u| u.uid)
            .filter(|uid| !uid.trim().is_empty())
    }
}

impl<T: UserContextProvider + ?Sized> UserContextProvider for Arc<T> {
    fn current_user(&self) -> Option<UserProfile> {
        (**self).current_user()
    }
}

/// Holds whatever profile the app signed in with.
#[derive(Debug, Default)]
pub struct SessionUserProvider {
    user: RwLock<Option<UserProfile>>,
}

impl SessionUserProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserProfile) {
        tracing::debug!(uid = %user.uid, "session signed in");
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        tracing::debug!("session signed out");
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl UserContextProvider for SessionUserProvider {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_sign_in_and_out() {
        let session = SessionUserProvider::new();
        assert_eq!(session.current_user_id(), None);

        session.sign_in(UserProfile::new("u1"));
        assert_eq!(session.current_user_id().as_deref(), Some("u1"));

        session.sign_out();
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn test_blank_uid_is_not_a_user() {
        let session = SessionUserProvider::signed_in(UserProfile::new("  "));
        assert!(session.current_user().is_some());
        assert_eq!(session.current_user_id(), None);
    }

    #[test]
    fn test_profile_decodes_camel_case() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"uid":"u1","username":"kay","referralCode":"KAY10","email":"k@example.com"}"#,
        )
        .unwrap();
        assert_eq!(profile.referral_code.as_deref(), Some("KAY10"));
        assert_eq!(profile.profile_image, None);
    }
}
