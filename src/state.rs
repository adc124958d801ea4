use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::{
    auth::repo::{PgUserStore, UserStore},
    config::{AppConfig, StoreBackend},
    db,
    memory::MemoryStore,
    thoughts::repo::{PgThoughtStore, ThoughtStore},
};

/// Application context built once at startup and shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub thoughts: Arc<dyn ThoughtStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        match config.backend {
            StoreBackend::Postgres => {
                let db_cfg = config
                    .database
                    .as_ref()
                    .context("postgres backend selected without database settings")?;
                let pool = db::connect(db_cfg).await?;
                Ok(Self {
                    users: Arc::new(PgUserStore::new(pool.clone())),
                    thoughts: Arc::new(PgThoughtStore::new(pool)),
                    config,
                })
            }
            StoreBackend::Memory => {
                warn!("using in-memory store; data is lost on restart");
                Ok(Self::with_memory(config))
            }
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            backend: StoreBackend::Memory,
            database: None,
        });
        Self::with_memory(config)
    }

    fn with_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            users: store.clone(),
            thoughts: store,
        }
    }
}
