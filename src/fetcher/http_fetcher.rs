use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::fetcher::parse::parse_items;
use crate::fetcher::{FetchError, Fetcher, RawItem};

pub struct HttpFetcher {
    client: Client,
    max_feed_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            max_feed_bytes: config.max_feed_bytes,
        })
    }

    fn check_size(&self, size: u64) -> Result<(), FetchError> {
        if size > self.max_feed_bytes {
            return Err(FetchError::TooLarge {
                size,
                max: self.max_feed_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>, FetchError> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        if let Some(length) = response.content_length() {
            self.check_size(length)?;
        }

        // Content-Length may be absent or wrong; count what actually arrives.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            self.check_size(body.len() as u64)?;
        }

        parse_items(&body)
    }
}
