use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRef, State,
    },
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginForm, MessageResponse, ProfilePatch, SignupRequest, UserProfile},
        extractors::AuthUser,
        jwt::JwtKeys,
        repo_types::ProfileChanges,
        services::{check_credentials, register, require_text},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/profile", put(update_profile))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let user = register(&state, payload).await?;

    let token = JwtKeys::from_ref(&state).issue_session(user.id, user.is_admin)?;
    Ok(Json(AuthResponse::bearer(token, UserProfile::with_admin(user))))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(|e| AppError::Validation(e.body_text()))?;
    let user = check_credentials(&state, &form.username, &form.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue_session(user.id, user.is_admin)?;
    let cookie = session_cookie(&token, keys.session_ttl.as_secs(), state.config.cookie_secure)?;

    info!(user_id = user.id, "user logged in");
    let body = Json(AuthResponse::bearer(token, UserProfile::with_admin(user)));
    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("access_token={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.into())
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Json(patch) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    if let Some(name) = &patch.full_name {
        require_text("full_name", name)?;
    }

    let changes: ProfileChanges = patch.into();
    let updated = state
        .users
        .update_profile(user.id, &changes)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    info!(user_id = user.id, "profile updated");
    Ok(Json(UserProfile::without_admin(updated)))
}

/// Tokens are stateless; nothing is invalidated server-side.
#[instrument(skip_all)]
pub async fn logout(AuthUser(user): AuthUser) -> Json<MessageResponse> {
    info!(user_id = user.id, "user logged out");
    Json(MessageResponse {
        message: "Successfully logged out",
    })
}
