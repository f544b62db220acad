use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::contact::repo::{ContactStore, PgContactStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = crate::db::connect(&config).await?;
        Ok(Self::from_pool(db, Arc::new(config)))
    }

    pub fn from_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgContactStore::new(db)),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        contacts: Arc<dyn ContactStore>,
    ) -> Self {
        Self {
            config,
            users,
            contacts,
        }
    }

    /// In-memory stores and a fixed test config.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(|_| {})
    }

    #[cfg(test)]
    pub fn fake_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        use crate::memory::{MemoryContactStore, MemoryUserStore};

        let mut config = AppConfig::for_tests();
        tweak(&mut config);

        Self::from_parts(
            Arc::new(config),
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryContactStore::default()),
        )
    }
}
