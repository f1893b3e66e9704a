use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::domain::FeedSource;
use crate::fetcher::{FetchError, Fetcher};
use crate::normalizer::Normalizer;
use crate::store::Store;

pub const DEFAULT_WORKERS: usize = 10;

/// Counters for one feed source within a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub examined: usize,
    pub written: usize,
}

/// Fans a refresh out over a fixed number of workers, one task per source.
pub struct ParallelIngestor {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    fetch_timeout: Duration,
}

impl ParallelIngestor {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, fetch_timeout: Duration) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS, fetch_timeout)
    }

    pub fn with_workers(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        workers: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            fetch_timeout,
        }
    }

    /// Fetches and stores every source. A failing source yields an `Err` for
    /// its id and never affects the others.
    pub async fn ingest_all<S: Store + Send + Sync + 'static>(
        &self,
        sources: Vec<FeedSource>,
        store: Arc<S>,
        normalizer: &Normalizer,
    ) -> Vec<(i64, Result<SourceReport, FetchError>)> {
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let store = store.clone();
            let normalizer = normalizer.clone();
            let fetch_timeout = self.fetch_timeout;
            let source_id = source.id;

            let handle = tokio::spawn(async move {
                // The semaphore is never closed; a missing permit only lifts the bound.
                let _permit = semaphore.acquire().await.ok();

                let result =
                    ingest_single_source(&fetcher, &source, &store, &normalizer, fetch_timeout)
                        .await;
                if let Err(e) = &result {
                    tracing::warn!(source = %source.url, error = %e, "Skipping feed source");
                }
                (source.id, result)
            });

            handles.push((source_id, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (source_id, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(source_id, "Task join error: {}", e);
                    results.push((source_id, Err(FetchError::Parse(e.to_string()))));
                }
            }
        }

        results
    }
}

async fn ingest_single_source<S: Store>(
    fetcher: &Arc<dyn Fetcher + Send + Sync>,
    source: &FeedSource,
    store: &Arc<S>,
    normalizer: &Normalizer,
    fetch_timeout: Duration,
) -> Result<SourceReport, FetchError> {
    let items = tokio::time::timeout(fetch_timeout, fetcher.fetch(&source.url))
        .await
        .map_err(|_| FetchError::Timeout(fetch_timeout))??;

    let mut report = SourceReport::default();
    for item in &items {
        report.examined += 1;

        let candidate = normalizer.normalize(source.id, item);
        if let Err(e) = candidate.validate() {
            tracing::debug!(source = %source.url, error = %e, "Dropping invalid item");
            continue;
        }

        match store.upsert_entry(&candidate) {
            Ok(outcome) if outcome.is_write() => report.written += 1,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(
                    source = %source.url,
                    link = %candidate.link,
                    error = %e,
                    "Failed to store item"
                );
            }
        }
    }

    tracing::info!(
        "Stored {} new or changed items from {}",
        report.written,
        source.url
    );
    Ok(report)
}
