use axum::async_trait;
use sqlx::PgPool;

use crate::{
    contact::repo_types::{ContactSubmission, NewContact},
    error::AppError,
    pagination::PageRequest,
};

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Inserts a submission and returns its generated id.
    async fn insert(&self, new: NewContact) -> Result<i64, AppError>;
    /// Newest-first window plus the unfiltered row count.
    async fn list_page(&self, page: PageRequest) -> Result<(Vec<ContactSubmission>, i64), AppError>;
}

#[derive(Clone)]
pub struct PgContactStore {
    db: PgPool,
}

impl PgContactStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, new: NewContact) -> Result<i64, AppError> {
        let mut tx = self.db.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO contact_submissions (name, email, subject, message, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .bind(&new.phone)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn list_page(&self, page: PageRequest) -> Result<(Vec<ContactSubmission>, i64), AppError> {
        // Both reads share one snapshot so `total` matches the page.
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT id, name, email, subject, message, phone, created_at
            FROM contact_submissions
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok((rows, total))
    }
}
