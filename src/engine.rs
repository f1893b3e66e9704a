use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use url::Url;

use crate::app::{FeedlineError, Result};
use crate::config::Config;
use crate::domain::{FeedSource, NewFeedSource, ValidationError};
use crate::fetcher::Fetcher;
use crate::ingest::{ParallelIngestor, RefreshReport, RetentionSweeper};
use crate::normalizer::Normalizer;
use crate::pagination::{self, FeedPage};
use crate::store::Store;

/// Outcome of a bulk subscription import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// One message per rejected source, in input order.
    pub errors: Vec<String>,
}

/// Ties storage, fetching, retention and the read side together for every
/// user of one store.
pub struct FeedEngine<S> {
    store: Arc<S>,
    ingestor: ParallelIngestor,
    normalizer: Normalizer,
    sweeper: RetentionSweeper,
    timezone: Tz,
}

impl<S: Store + Send + Sync + 'static> FeedEngine<S> {
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        config: &Config,
    ) -> Result<Self> {
        let ingestor = ParallelIngestor::with_workers(
            fetcher,
            config.fetch.workers,
            Duration::from_secs(config.fetch.timeout_secs),
        );

        Ok(Self {
            store,
            ingestor,
            normalizer: Normalizer::new(),
            sweeper: RetentionSweeper::from_config(&config.retention)?,
            timezone: config.timezone()?,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Runs the retention sweep when due, then fetches and stores every
    /// source of the user. Individual sources may fail without failing the
    /// refresh; only listing the sources is fatal.
    pub async fn refresh_feeds(&self, user_id: i64) -> Result<RefreshReport> {
        let sweep = self.sweeper.sweep(self.store.as_ref(), Utc::now());
        let mut report = RefreshReport::new(sweep);

        let sources = self.store.get_sources_by_user(user_id)?;
        report.sources = sources.len();
        if sources.is_empty() {
            tracing::debug!(user_id, "No feed sources to refresh");
            return Ok(report);
        }

        let results = self
            .ingestor
            .ingest_all(sources, self.store.clone(), &self.normalizer)
            .await;

        for (_, result) in results {
            match result {
                Ok(source) => {
                    report.items_examined += source.examined;
                    report.items_new_or_updated += source.written;
                }
                Err(_) => report.sources_failed += 1,
            }
        }

        tracing::info!(
            user_id,
            sources = report.sources,
            failed = report.sources_failed,
            examined = report.items_examined,
            written = report.items_new_or_updated,
            "Refresh finished"
        );
        Ok(report)
    }

    pub fn get_page(&self, user_id: i64, days_offset: u32) -> Result<FeedPage> {
        self.get_page_at(user_id, days_offset, Utc::now())
    }

    /// `get_page` as seen at `now`.
    pub fn get_page_at(
        &self,
        user_id: i64,
        days_offset: u32,
        now: DateTime<Utc>,
    ) -> Result<FeedPage> {
        pagination::build_page(self.store.as_ref(), user_id, days_offset, &self.timezone, now)
    }

    /// The first page is served fresh: offset 0 refreshes inline before reading.
    pub async fn view_page(&self, user_id: i64, days_offset: u32) -> Result<FeedPage> {
        if days_offset == 0 {
            if let Err(e) = self.refresh_feeds(user_id).await {
                tracing::warn!(user_id, error = %e, "Refresh before first page failed");
            }
        }
        self.get_page(user_id, days_offset)
    }

    pub fn add_source(&self, user_id: i64, name: &str, url: &str) -> Result<FeedSource> {
        let new_source = Self::checked_source(user_id, name, url)?;

        if self.store.source_exists_by_url(user_id, &new_source.url)? {
            return Err(FeedlineError::FeedAlreadyExists(new_source.url));
        }

        let source = self.store.add_source(&new_source)?;
        tracing::info!(user_id, id = source.id, url = %source.url, "Added feed source");
        Ok(source)
    }

    pub fn list_sources(&self, user_id: i64) -> Result<Vec<FeedSource>> {
        self.store.get_sources_by_user(user_id)
    }

    pub fn update_source(
        &self,
        user_id: i64,
        id: i64,
        name: &str,
        url: &str,
    ) -> Result<FeedSource> {
        let changed = Self::checked_source(user_id, name, url)?;

        if !self
            .store
            .update_source(id, user_id, &changed.name, &changed.url)?
        {
            return Err(FeedlineError::FeedNotFound(id));
        }

        self.store
            .get_source(id)?
            .ok_or(FeedlineError::FeedNotFound(id))
    }

    /// Removes the source together with all of its entries.
    pub fn remove_source(&self, user_id: i64, id: i64) -> Result<()> {
        if !self.store.delete_source(id, user_id)? {
            return Err(FeedlineError::FeedNotFound(id));
        }
        tracing::info!(user_id, id, "Removed feed source");
        Ok(())
    }

    /// Adds each (name, url) pair, continuing past rejected ones.
    pub fn import_sources<I, N, U>(&self, user_id: i64, sources: I) -> ImportReport
    where
        I: IntoIterator<Item = (N, U)>,
        N: AsRef<str>,
        U: AsRef<str>,
    {
        let mut report = ImportReport::default();
        for (name, url) in sources {
            match self.add_source(user_id, name.as_ref(), url.as_ref()) {
                Ok(_) => report.added += 1,
                Err(e) => report.errors.push(format!("{}: {}", url.as_ref(), e)),
            }
        }
        report
    }

    pub fn export_sources(&self, user_id: i64) -> Result<Vec<(String, String)>> {
        Ok(self
            .list_sources(user_id)?
            .into_iter()
            .map(|source| (source.name, source.url))
            .collect())
    }

    fn checked_source(user_id: i64, name: &str, url: &str) -> Result<NewFeedSource> {
        let source = NewFeedSource::new(user_id, name, url);
        source.validate()?;

        let parsed = Url::parse(&source.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()).into());
        }

        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::fetcher::{FetchError, RawItem};
    use crate::store::SqliteStore;

    struct NoFeeds;

    #[async_trait]
    impl Fetcher for NoFeeds {
        async fn fetch(&self, _url: &str) -> std::result::Result<Vec<RawItem>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn engine() -> FeedEngine<SqliteStore> {
        FeedEngine::new(
            Arc::new(SqliteStore::in_memory().unwrap()),
            Arc::new(NoFeeds),
            &Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_source_validation() {
        let engine = engine();

        assert!(matches!(
            engine.add_source(1, "", "https://a.example/feed"),
            Err(FeedlineError::Validation(ValidationError::EmptyName))
        ));
        assert!(matches!(
            engine.add_source(1, "A", "not a url"),
            Err(FeedlineError::InvalidUrl(_))
        ));
        assert!(matches!(
            engine.add_source(1, "A", "ftp://a.example/feed"),
            Err(FeedlineError::Validation(ValidationError::UnsupportedScheme(_)))
        ));
        assert!(matches!(
            engine.add_source(0, "A", "https://a.example/feed"),
            Err(FeedlineError::Validation(ValidationError::InvalidUserId(0)))
        ));
    }

    #[test]
    fn test_duplicate_url_per_user() {
        let engine = engine();
        engine.add_source(1, "A", "https://a.example/feed").unwrap();

        assert!(matches!(
            engine.add_source(1, "Again", "https://a.example/feed"),
            Err(FeedlineError::FeedAlreadyExists(_))
        ));
        assert!(engine.add_source(2, "A", "https://a.example/feed").is_ok());
    }

    #[test]
    fn test_update_cannot_take_another_sources_url() {
        let engine = engine();
        engine.add_source(1, "A", "https://a.example/feed").unwrap();
        let b = engine.add_source(1, "B", "https://b.example/feed").unwrap();

        assert!(matches!(
            engine.update_source(1, b.id, "B", "https://a.example/feed"),
            Err(FeedlineError::FeedAlreadyExists(_))
        ));
        let sources = engine.list_sources(1).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].url, "https://b.example/feed");
    }

    #[test]
    fn test_update_and_remove_check_owner() {
        let engine = engine();
        let source = engine.add_source(1, "A", "https://a.example/feed").unwrap();

        assert!(matches!(
            engine.update_source(2, source.id, "B", "https://b.example/feed"),
            Err(FeedlineError::FeedNotFound(_))
        ));
        let renamed = engine
            .update_source(1, source.id, "B", "https://a.example/feed")
            .unwrap();
        assert_eq!(renamed.name, "B");

        assert!(matches!(
            engine.remove_source(2, source.id),
            Err(FeedlineError::FeedNotFound(_))
        ));
        engine.remove_source(1, source.id).unwrap();
        assert!(engine.list_sources(1).unwrap().is_empty());
    }

    #[test]
    fn test_import_continues_past_errors() {
        let engine = engine();
        let report = engine.import_sources(
            1,
            vec![
                ("A", "https://a.example/feed"),
                ("Broken", "nope"),
                ("A twice", "https://a.example/feed"),
                ("B", "https://b.example/feed"),
            ],
        );

        assert_eq!(report.added, 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(
            engine.export_sources(1).unwrap(),
            vec![
                ("A".to_string(), "https://a.example/feed".to_string()),
                ("B".to_string(), "https://b.example/feed".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_refresh_without_sources() {
        let report = engine().refresh_feeds(1).await.unwrap();
        assert_eq!(report.sources, 0);
        assert_eq!(report.items_examined, 0);
    }
}
