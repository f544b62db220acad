//! In-memory stores backing `AppState::fake`.

use std::sync::Mutex;

use axum::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{
        password,
        repo::UserStore,
        repo_types::{NewUser, ProfileChanges, User},
    },
    contact::{
        repo::ContactStore,
        repo_types::{ContactSubmission, NewContact},
    },
    error::AppError,
    pagination::PageRequest,
};

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new: NewUser) -> Result<i64, AppError> {
        let hash = password::hash_unless_prehashed(&new.password)?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == new.email) {
            return Err(AppError::DuplicateEmail);
        }
        let id = rows.len() as i64 + 1;
        rows.push(User {
            id,
            email: new.email,
            password_hash: hash,
            full_name: new.full_name,
            company: new.company,
            phone: new.phone,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            is_active: true,
            is_admin: new.is_admin,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(user) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(user.clone()));
        }
        if let Some(name) = &changes.full_name {
            user.full_name = name.clone();
        }
        if let Some(company) = &changes.company {
            user.company = company.clone();
        }
        if let Some(phone) = &changes.phone {
            user.phone = phone.clone();
        }
        user.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(user.clone()))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

impl MemoryUserStore {
    pub fn set_admin(&self, id: i64, is_admin: bool) {
        if let Some(user) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.is_admin = is_admin;
        }
    }
}

#[derive(Default)]
pub struct MemoryContactStore {
    rows: Mutex<Vec<ContactSubmission>>,
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, new: NewContact) -> Result<i64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(ContactSubmission {
            id,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            phone: new.phone,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn list_page(&self, page: PageRequest) -> Result<(Vec<ContactSubmission>, i64), AppError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = rows.len() as i64;
        Ok((page.slice(&rows).to_vec(), total))
    }
}
