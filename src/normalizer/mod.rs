pub mod content;
pub mod dates;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

use crate::domain::CandidateEntry;
use crate::fetcher::RawItem;

/// Turns raw feed items into store candidates: titles and links trimmed,
/// descriptions sanitized, timestamps resolved to UTC.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, feed_source_id: i64, item: &RawItem) -> CandidateEntry {
        self.normalize_at(feed_source_id, item, Utc::now())
    }

    pub fn normalize_at(
        &self,
        feed_source_id: i64,
        item: &RawItem,
        now: DateTime<Utc>,
    ) -> CandidateEntry {
        CandidateEntry {
            feed_source_id,
            title: decode_html_entities(item.title.trim()).trim().to_string(),
            description: content::sanitize(&item.description),
            link: item.link.trim().to_string(),
            published_at: dates::normalize_at(&item.published_raw, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_normalize_raw_item() {
        let normalizer = Normalizer::new();
        let raw = RawItem {
            title: "  Rust &amp; Friends ".into(),
            description: "<p>Hello <b>there</b></p>".into(),
            link: " https://example.com/a ".into(),
            published_raw: "Mon, 01 Jan 2024 00:00:00 GMT".into(),
        };

        let entry = normalizer.normalize(7, &raw);
        assert_eq!(entry.feed_source_id, 7);
        assert_eq!(entry.title, "Rust & Friends");
        assert_eq!(entry.description, "Hello there");
        assert_eq!(entry.link, "https://example.com/a");
        assert_eq!(
            entry.published_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_date_uses_now() {
        let normalizer = Normalizer::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let raw = RawItem {
            title: "t".into(),
            link: "https://example.com/t".into(),
            ..RawItem::default()
        };

        assert_eq!(normalizer.normalize_at(1, &raw, now).published_at, now);
    }

    #[test]
    fn test_blank_title_stays_blank_for_validation() {
        let normalizer = Normalizer::new();
        let raw = RawItem {
            title: "   ".into(),
            link: "https://example.com/t".into(),
            ..RawItem::default()
        };

        let entry = normalizer.normalize(1, &raw);
        assert!(entry.validate().is_err());
    }
}
