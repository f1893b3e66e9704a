//! Calendar-day bucketing and labels for the timeline.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::domain::SourcedEntry;

/// Entries published on one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub label: String,
    pub entries: Vec<SourcedEntry>,
}

/// Groups newest-first entries by their calendar day in `tz`.
///
/// Buckets come out most recent day first and each keeps the incoming
/// order of its entries.
pub fn group_by_day(entries: Vec<SourcedEntry>, tz: &Tz, now: DateTime<Utc>) -> Vec<DateBucket> {
    let today = now.with_timezone(tz).date_naive();
    let mut buckets: Vec<DateBucket> = Vec::new();

    for entry in entries {
        let date = entry.entry.published_at.with_timezone(tz).date_naive();
        match buckets.iter_mut().find(|bucket| bucket.date == date) {
            Some(bucket) => bucket.entries.push(entry),
            None => buckets.push(DateBucket {
                date,
                label: day_label(date, today),
                entries: vec![entry],
            }),
        }
    }

    // Stable, so entries sharing a day never move relative to each other.
    buckets.sort_by(|a, b| b.date.cmp(&a.date));
    buckets
}

/// Display label of `date` as seen on `today`.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => date.format("%A").to_string(),
        _ if date.year() == today.year() => date.format("%B %-d").to_string(),
        _ => date.format("%B %-d, %Y").to_string(),
    }
}
