use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{FeedlineError, Result};
use crate::config::Config;
use crate::engine::FeedEngine;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::store::sqlite::SqliteStore;

/// Everything a command needs, built from one configuration.
pub struct AppContext {
    pub config: Config,
    pub engine: FeedEngine<SqliteStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.database.path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!(path = %db_path.display(), "Opened database");
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        let engine = FeedEngine::new(store, fetcher, &config)?;

        Ok(Self { config, engine })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| FeedlineError::Other("Could not find data directory".into()))?;
        Ok(data_dir.join("feedline").join("feedline.db"))
    }
}
