use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::SignupRequest,
        password::{hash_password, verify_against_dummy, verify_password},
        repo_types::{NewUser, User},
    },
    error::AppError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Creates the account described by `req` and returns the stored row.
pub async fn register(state: &AppState, req: SignupRequest) -> Result<User, AppError> {
    let email = req.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    require_text("password", &req.password)?;
    require_text("full_name", &req.full_name)?;

    let is_admin = if req.is_admin {
        if !state.config.allow_admin_signup {
            warn!(email = %email, "admin signup refused");
            return Err(AppError::Forbidden("Admin signup is disabled".into()));
        }
        warn!(email = %email, "self-service admin signup");
        true
    } else {
        false
    };

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    // Hash here so a caller-chosen password that looks like a PHC string is
    // never taken for a pre-hashed seed value.
    let password_hash = hash_password(&req.password)?;
    let id = state
        .users
        .create_user(NewUser {
            email,
            password: password_hash,
            full_name: req.full_name,
            company: req.company,
            phone: req.phone,
            is_admin,
        })
        .await?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {id} missing after insert"))?;

    info!(user_id = user.id, is_admin = user.is_admin, "user registered");
    Ok(user)
}

/// Resolves email + password to a user. Unknown email and wrong password
/// produce the same error.
pub async fn check_credentials(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let invalid = || AppError::unauthorized("Incorrect email or password");

    let Some(user) = state.users.find_by_email(email.trim()).await? else {
        verify_against_dummy(password);
        warn!("login for unknown email");
        return Err(invalid());
    };
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = user.id, "login with wrong password");
        return Err(invalid());
    }
    Ok(user)
}
