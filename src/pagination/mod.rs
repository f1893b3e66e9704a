//! Read side: a fixed-width window of a user's entries, grouped by local
//! calendar day, with the cursor for the next window.

pub mod grouping;

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::app::Result;
use crate::domain::SourcedEntry;
use crate::store::Store;

pub use grouping::{day_label, group_by_day, DateBucket};

/// Width of one page, in days.
pub const WINDOW_DAYS: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub buckets: Vec<DateBucket>,
    /// An entry older than this window exists.
    pub has_more: bool,
    /// Distinct source names present in this window, sorted.
    pub feed_names: Vec<String>,
    pub offset: u32,
    pub next_offset: u32,
}

impl FeedPage {
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Inclusive range of published_at values covered by one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// `None` when the window lies before the earliest representable instant.
    pub fn at(now: DateTime<Utc>, days_offset: u32) -> Option<Self> {
        let end = now.checked_sub_signed(Duration::try_days(i64::from(days_offset))?)?;
        let start = end.checked_sub_signed(Duration::try_days(i64::from(WINDOW_DAYS))?)?;
        Some(Self { start, end })
    }
}

/// Builds the page at `days_offset` and marks all of the user's entries seen.
pub fn build_page<S: Store + ?Sized>(
    store: &S,
    user_id: i64,
    days_offset: u32,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<FeedPage> {
    let (entries, has_more) = match Window::at(now, days_offset) {
        Some(window) => {
            let entries = store.entries_in_window(user_id, window.start, window.end)?;
            let has_more = match store.has_entries_before(user_id, window.start) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Could not check for older entries");
                    false
                }
            };
            (entries, has_more)
        }
        None => {
            tracing::debug!(user_id, days_offset, "Window lies before any storable entry");
            (Vec::new(), false)
        }
    };

    let feed_names = feed_names(&entries);
    let buckets = group_by_day(entries, tz, now);

    let seen = store.mark_all_seen(user_id)?;
    tracing::debug!(user_id, days_offset, seen, "Served page");

    Ok(FeedPage {
        buckets,
        has_more,
        feed_names,
        offset: days_offset,
        next_offset: days_offset.saturating_add(WINDOW_DAYS),
    })
}

fn feed_names(entries: &[SourcedEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.feed_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
