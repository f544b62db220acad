use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::auth::{
    extractors::UserIdentity,
    repo_types::{ProfileChanges, User},
};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Form-encoded login body; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Partial profile update. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

impl From<ProfilePatch> for ProfileChanges {
    fn from(p: ProfilePatch) -> Self {
        Self {
            full_name: p.full_name,
            company: p.company,
            phone: p.phone,
        }
    }
}

// A present key (even `null`) becomes `Some(..)`; an absent key stays `None`
// through `#[serde(default)]`.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserProfile,
}

impl AuthResponse {
    pub fn bearer(access_token: String, user: UserProfile) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            user,
        }
    }
}

/// Outward user representation. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl UserProfile {
    pub fn with_admin(user: User) -> Self {
        let is_admin = user.is_admin;
        Self {
            is_admin: Some(is_admin),
            ..Self::without_admin(user)
        }
    }

    /// Shape used by `/auth/me` and profile updates.
    pub fn without_admin(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            company: user.company,
            phone: user.phone,
            created_at: user.created_at,
            is_active: user.is_active,
            is_admin: None,
        }
    }
}

/// Same shape as `UserProfile::without_admin`, built from the caller.
impl From<UserIdentity> for UserProfile {
    fn from(who: UserIdentity) -> Self {
        Self {
            id: who.id,
            email: who.email,
            full_name: who.full_name,
            company: who.company,
            phone: who.phone,
            created_at: who.created_at,
            is_active: who.is_active,
            is_admin: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
