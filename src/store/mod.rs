pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{CandidateEntry, FeedEntry, FeedSource, NewFeedSource, SourcedEntry};

pub use sqlite::SqliteStore;

/// 0000-01-01T00:00:00Z
const EARLIEST_STORABLE_SECS: i64 = -62_167_219_200;
/// 9999-12-31T23:59:59Z
const LATEST_STORABLE_SECS: i64 = 253_402_300_799;

/// Pins `dt` into the four-digit-year range. Timestamps are stored as text and
/// compared lexically, which only matches time order inside that range.
pub fn clamp_to_storable(dt: DateTime<Utc>) -> DateTime<Utc> {
    let earliest =
        DateTime::from_timestamp(EARLIEST_STORABLE_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest = DateTime::from_timestamp(LATEST_STORABLE_SECS, 999_999_000)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    dt.clamp(earliest, latest)
}

/// What an upsert did to the row keyed by (feed_source_id, link).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

impl UpsertOutcome {
    /// Created or updated, i.e. the entry is (again) new to its reader.
    pub fn is_write(self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged)
    }
}

pub trait Store {
    // Feed source operations
    fn add_source(&self, source: &NewFeedSource) -> Result<FeedSource>;
    fn get_source(&self, id: i64) -> Result<Option<FeedSource>>;
    fn get_sources_by_user(&self, user_id: i64) -> Result<Vec<FeedSource>>;
    fn source_exists_by_url(&self, user_id: i64, url: &str) -> Result<bool>;
    /// Returns false when no source with this id belongs to the user.
    fn update_source(&self, id: i64, user_id: i64, name: &str, url: &str) -> Result<bool>;
    /// Removes the source and, by cascade, all of its entries.
    fn delete_source(&self, id: i64, user_id: i64) -> Result<bool>;

    // Entry operations
    fn upsert_entry(&self, entry: &CandidateEntry) -> Result<UpsertOutcome>;
    fn get_entry(&self, feed_source_id: i64, link: &str) -> Result<Option<FeedEntry>>;
    /// Entries of the user published within [start, end], newest first.
    fn entries_in_window(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SourcedEntry>>;
    /// Whether the user has at least one entry published before `cutoff`.
    fn has_entries_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<bool>;
    fn mark_all_seen(&self, user_id: i64) -> Result<usize>;
    /// Deletes entries of every user published before `cutoff`.
    fn delete_entries_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
