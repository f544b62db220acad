use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::jwt::JwtKeys;
use crate::{auth::repo_types::User, error::AppError, state::AppState};

/// Caller resolved from a bearer token. Profile fields come from the store;
/// `is_admin` comes from the verified token.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub created_at: OffsetDateTime,
    pub is_active: bool,
    pub is_admin: bool,
}

impl UserIdentity {
    fn from_parts(user: User, is_admin: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            company: user.company,
            phone: user.phone,
            created_at: user.created_at,
            is_active: user.is_active,
            is_admin,
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the token and loads its subject from the credential store.
pub async fn authenticate(state: &AppState, token: Option<&str>) -> Result<UserIdentity, AppError> {
    let token = token.ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token)?;
    let user_id = claims.user_id().ok_or(AppError::InvalidToken)?;

    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id, "token subject no longer exists");
        AppError::unauthorized("User not found")
    })?;

    debug!(user_id, is_admin = claims.is_admin, "request authenticated");
    Ok(UserIdentity::from_parts(user, claims.is_admin))
}

pub fn require_admin(identity: UserIdentity) -> Result<UserIdentity, AppError> {
    if identity.is_admin {
        Ok(identity)
    } else {
        warn!(user_id = identity.id, "admin route denied");
        Err(AppError::Forbidden("Not an admin user".into()))
    }
}

/// Any authenticated caller.
pub struct AuthUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, bearer_token(&parts.headers))
            .await
            .map(AuthUser)
    }
}

/// Authenticated caller whose token carries the admin flag.
pub struct AdminUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        require_admin(identity).map(AdminUser)
    }
}
