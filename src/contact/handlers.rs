use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        extractors::AdminUser,
        services::{is_valid_email, require_text},
    },
    contact::dto::{ContactForm, ContactPage, ContactSubmitted},
    error::AppError,
    pagination::PageRequest,
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/contacts", get(list_contacts))
}

#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactSubmitted>, AppError> {
    let Json(form) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    require_text("name", &form.name)?;
    require_text("subject", &form.subject)?;
    require_text("message", &form.message)?;
    if !is_valid_email(form.email.trim()) {
        return Err(AppError::Validation("Invalid email".into()));
    }

    let id = state.contacts.insert(form.into()).await?;
    info!(submission_id = id, "contact form stored");

    Ok(Json(ContactSubmitted {
        message: "Contact form submitted successfully",
        submission_id: id,
        status: "success",
    }))
}

#[instrument(skip_all)]
pub async fn list_contacts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<ContactPage>, AppError> {
    let Query(req) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let page = req.validated()?;

    let (submissions, total) = state.contacts.list_page(page).await?;
    info!(
        admin_id = admin.id,
        page = page.page,
        returned = submissions.len(),
        total,
        "contact submissions listed"
    );

    Ok(Json(ContactPage {
        submissions,
        total,
        page: page.page,
        page_size: page.page_size,
    }))
}
