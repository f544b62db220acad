use axum::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::{
    auth::{
        password,
        repo_types::{NewUser, ProfileChanges, User},
    },
    error::AppError,
};

const USER_COLUMNS: &str = "id, email, password_hash, full_name, company, phone, \
                            created_at, updated_at, is_active, is_admin";

/// Credential store. The uniqueness constraint on `email` is the
/// authoritative duplicate check; losers of a race get `DuplicateEmail`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<i64, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    /// Returns `None` when no user has `id`.
    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new: NewUser) -> Result<i64, AppError> {
        let hash = password::hash_unless_prehashed(&new.password)?;

        let mut tx = self.db.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, full_name, company, phone, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.email)
        .bind(&hash)
        .bind(&new.full_name)
        .bind(&new.company)
        .bind(&new.phone)
        .bind(new.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_email)?;
        tx.commit().await?;

        debug!(user_id = id, "user row inserted");
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, AppError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET full_name  = COALESCE($2, full_name),
                   company    = CASE WHEN $3 THEN $4 ELSE company END,
                   phone      = CASE WHEN $5 THEN $6 ELSE phone END,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.full_name)
        .bind(changes.company.is_some())
        .bind(changes.company.clone().flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.clone().flatten())
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(user)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }
}

fn map_unique_email(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateEmail,
        _ => AppError::Store(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password: password.into(),
            full_name: "Test User".into(),
            company: Some("TestCo".into()),
            phone: Some("1234567890".into()),
            is_admin: false,
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn create_and_find_user(db: PgPool) {
        let store = PgUserStore::new(db);
        let id = store.create_user(new_user("a@example.com", "password123")).await.unwrap();

        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        let by_email = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_id.id, by_email.id);
        assert!(by_id.is_active);
        assert!(!by_id.is_admin);
        assert!(by_id.updated_at.is_none());
        assert!(password::verify_password("password123", &by_id.password_hash));
        assert!(store.find_by_id(id + 1000).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_email_maps_to_duplicate_error(db: PgPool) {
        let store = PgUserStore::new(db);
        store.create_user(new_user("dup@example.com", "pw")).await.unwrap();
        let err = store.create_user(new_user("dup@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn prehashed_password_is_stored_verbatim(db: PgPool) {
        let store = PgUserStore::new(db);
        let hash = password::hash_password("seeded").unwrap();
        let id = store.create_user(new_user("seed@example.com", &hash)).await.unwrap();
        let user = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, hash);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn update_profile_changes_only_supplied_fields(db: PgPool) {
        let store = PgUserStore::new(db);
        let id = store.create_user(new_user("edit@example.com", "pw")).await.unwrap();

        let changes = ProfileChanges {
            company: Some(Some("NewCo".into())),
            ..Default::default()
        };
        let user = store.update_profile(id, &changes).await.unwrap().unwrap();
        assert_eq!(user.company.as_deref(), Some("NewCo"));
        assert_eq!(user.full_name, "Test User");
        assert_eq!(user.phone.as_deref(), Some("1234567890"));
        assert!(user.updated_at.is_some());

        let changes = ProfileChanges {
            full_name: Some("Renamed".into()),
            phone: Some(None),
            ..Default::default()
        };
        let user = store.update_profile(id, &changes).await.unwrap().unwrap();
        assert_eq!(user.full_name, "Renamed");
        assert_eq!(user.phone, None);
        assert_eq!(user.company.as_deref(), Some("NewCo"));

        let missing = store.update_profile(id + 1000, &changes).await.unwrap();
        assert!(missing.is_none());
    }
}
