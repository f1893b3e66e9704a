//! Feed body parsing.
//!
//! RSS is read with the `rss` crate, which hands back `pubDate` exactly as
//! written so the date normalizer sees the raw text. Anything that is not RSS
//! (Atom, JSON Feed, RSS 1.0) goes through `feed-rs`, which only exposes parsed
//! timestamps; those are rendered back as RFC 3339.

use chrono::SecondsFormat;
use feed_rs::parser;

use crate::fetcher::{FetchError, RawItem};

pub fn parse_items(body: &[u8]) -> Result<Vec<RawItem>, FetchError> {
    match rss::Channel::read_from(body) {
        Ok(channel) => Ok(channel.items().iter().map(rss_item).collect()),
        Err(rss_err) => {
            tracing::debug!("Not an RSS 2.0 document ({}), trying generic parser", rss_err);
            let feed = parser::parse(body).map_err(|e| FetchError::Parse(e.to_string()))?;
            Ok(feed.entries.into_iter().map(generic_entry).collect())
        }
    }
}

fn rss_item(item: &rss::Item) -> RawItem {
    let link = item
        .link()
        .map(str::to_string)
        .or_else(|| {
            item.guid()
                .filter(|guid| guid.is_permalink())
                .map(|guid| guid.value().to_string())
        })
        .unwrap_or_default();

    let published_raw = item
        .pub_date()
        .map(str::to_string)
        .or_else(|| {
            item.dublin_core_ext()
                .and_then(|dc| dc.dates().first().cloned())
        })
        .unwrap_or_default();

    RawItem {
        title: item.title().unwrap_or_default().to_string(),
        description: item
            .description()
            .or_else(|| item.content())
            .unwrap_or_default()
            .to_string(),
        link,
        published_raw,
    }
}

fn generic_entry(entry: feed_rs::model::Entry) -> RawItem {
    RawItem {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        description: entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default(),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        published_raw: entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
    }
}
