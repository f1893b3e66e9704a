pub mod http_fetcher;
pub mod parse;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// One item as published by a feed, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Publish timestamp exactly as the feed wrote it; empty when absent.
    pub published_raw: String,
}

/// Why a feed source could not be turned into items.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("feed could not be parsed: {0}")]
    Parse(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Feed source adapter: fetch a URL and return its items.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>, FetchError>;
}
