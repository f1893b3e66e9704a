//! Shared fixtures for engine tests: an in-memory engine and a fetcher that
//! serves canned items.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use feedline::config::Config;
use feedline::engine::FeedEngine;
use feedline::fetcher::{FetchError, Fetcher, RawItem};
use feedline::store::SqliteStore;

/// Serves whatever was last `set` for a URL. Unknown URLs fail to parse,
/// URLs marked slow never answer in time.
#[derive(Default)]
pub struct CannedFetcher {
    feeds: Mutex<HashMap<String, Vec<RawItem>>>,
    slow: Mutex<HashSet<String>>,
}

impl CannedFetcher {
    pub fn set(&self, url: &str, items: Vec<RawItem>) {
        self.feeds.lock().unwrap().insert(url.to_string(), items);
    }

    pub fn make_slow(&self, url: &str) {
        self.slow.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>, FetchError> {
        let slow = self.slow.lock().unwrap().contains(url);
        if slow {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }

        self.feeds
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Parse(format!("not a feed: {url}")))
    }
}

pub fn engine_with(config: &Config) -> (FeedEngine<SqliteStore>, Arc<CannedFetcher>) {
    let fetcher = Arc::new(CannedFetcher::default());
    let engine = FeedEngine::new(
        Arc::new(SqliteStore::in_memory().unwrap()),
        fetcher.clone(),
        config,
    )
    .unwrap();
    (engine, fetcher)
}

pub fn engine() -> (FeedEngine<SqliteStore>, Arc<CannedFetcher>) {
    engine_with(&Config::default())
}

pub fn item(link: &str, title: &str, published: DateTime<Utc>) -> RawItem {
    RawItem {
        title: title.to_string(),
        description: format!("<p>About {title}</p>"),
        link: link.to_string(),
        published_raw: published.to_rfc2822(),
    }
}
