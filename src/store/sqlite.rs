use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rusqlite_migration::{Migrations, M};

use crate::app::{FeedlineError, Result};
use crate::domain::{CandidateEntry, FeedEntry, FeedSource, NewFeedSource, SourcedEntry};
use crate::store::{clamp_to_storable, Store, UpsertOutcome};

const ENTRY_COLUMNS: &str = "e.id, e.feed_source_id, e.title, e.description, e.link, \
     e.published_at, e.is_new, e.created_at, e.updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![
            M::up(include_str!("../../migrations/001-initial/up.sql")),
            M::up(include_str!("../../migrations/002-unique-source-url/up.sql")),
        ]);

        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            FeedlineError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    /// A user subscribing to one URL twice trips the (user_id, url) index.
    fn duplicate_url(err: rusqlite::Error, url: &str) -> FeedlineError {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                FeedlineError::FeedAlreadyExists(url.to_string())
            }
            _ => FeedlineError::Database(err),
        }
    }

    /// Fixed-width UTC text, so that string order is time order.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        clamp_to_storable(*dt).to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn datetime_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let text: String = row.get(idx)?;
        Self::parse_datetime(&text).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                format!("invalid timestamp '{}'", text).into(),
            )
        })
    }

    fn source_from_row(row: &Row) -> rusqlite::Result<FeedSource> {
        Ok(FeedSource {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            url: row.get(3)?,
            created_at: Self::datetime_column(row, 4)?,
        })
    }

    /// Maps the leading [`ENTRY_COLUMNS`].
    fn entry_from_row(row: &Row) -> rusqlite::Result<FeedEntry> {
        Ok(FeedEntry {
            id: row.get(0)?,
            feed_source_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            link: row.get(4)?,
            published_at: Self::datetime_column(row, 5)?,
            is_new: row.get::<_, i32>(6)? != 0,
            created_at: Self::datetime_column(row, 7)?,
            updated_at: Self::datetime_column(row, 8)?,
        })
    }
}

impl Store for SqliteStore {
    fn add_source(&self, source: &NewFeedSource) -> Result<FeedSource> {
        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO feed_sources (user_id, name, url, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                source.user_id,
                source.name,
                source.url,
                Self::format_datetime(&created_at)
            ],
        )
        .map_err(|e| Self::duplicate_url(e, &source.url))?;

        Ok(FeedSource {
            id: conn.last_insert_rowid(),
            user_id: source.user_id,
            name: source.name.clone(),
            url: source.url.clone(),
            created_at,
        })
    }

    fn get_source(&self, id: i64) -> Result<Option<FeedSource>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, user_id, name, url, created_at FROM feed_sources WHERE id = ?1",
                params![id],
                Self::source_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_sources_by_user(&self, user_id: i64) -> Result<Vec<FeedSource>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, url, created_at
             FROM feed_sources WHERE user_id = ?1 ORDER BY name, id",
        )?;

        let sources = stmt
            .query_map(params![user_id], Self::source_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sources)
    }

    fn source_exists_by_url(&self, user_id: i64, url: &str) -> Result<bool> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM feed_sources WHERE user_id = ?1 AND url = ?2)",
            params![user_id, url],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn update_source(&self, id: i64, user_id: i64, name: &str, url: &str) -> Result<bool> {
        let conn = self.conn()?;

        let changed = conn
            .execute(
                "UPDATE feed_sources SET name = ?1, url = ?2 WHERE id = ?3 AND user_id = ?4",
                params![name, url, id, user_id],
            )
            .map_err(|e| Self::duplicate_url(e, url))?;

        Ok(changed > 0)
    }

    fn delete_source(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM feed_sources WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;

        Ok(deleted > 0)
    }

    fn upsert_entry(&self, entry: &CandidateEntry) -> Result<UpsertOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = Self::format_datetime(&Utc::now());

        let existed: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM feed_entries WHERE feed_source_id = ?1 AND link = ?2)",
            params![entry.feed_source_id, entry.link],
            |row| row.get(0),
        )?;

        // The WHERE clause turns a re-fetch with identical content into a no-op,
        // leaving published_at, updated_at and is_new untouched.
        let changed = tx.execute(
            "INSERT INTO feed_entries
                 (feed_source_id, title, description, link, published_at, is_new, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             ON CONFLICT (feed_source_id, link) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 published_at = excluded.published_at,
                 updated_at = excluded.updated_at,
                 is_new = 1
             WHERE feed_entries.title != excluded.title
                OR feed_entries.description != excluded.description",
            params![
                entry.feed_source_id,
                entry.title,
                entry.description,
                entry.link,
                Self::format_datetime(&entry.published_at),
                now
            ],
        )?;

        tx.commit()?;

        Ok(match (existed, changed) {
            (_, 0) => UpsertOutcome::Unchanged,
            (true, _) => UpsertOutcome::Updated,
            (false, _) => UpsertOutcome::Created,
        })
    }

    fn get_entry(&self, feed_source_id: i64, link: &str) -> Result<Option<FeedEntry>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!(
                    "SELECT {} FROM feed_entries e WHERE e.feed_source_id = ?1 AND e.link = ?2",
                    ENTRY_COLUMNS
                ),
                params![feed_source_id, link],
                Self::entry_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn entries_in_window(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SourcedEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {}, s.name
             FROM feed_entries e
             JOIN feed_sources s ON e.feed_source_id = s.id
             WHERE s.user_id = ?1
               AND e.published_at >= ?2
               AND e.published_at <= ?3
             ORDER BY e.published_at DESC, e.id DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(
                params![
                    user_id,
                    Self::format_datetime(&start),
                    Self::format_datetime(&end)
                ],
                |row| {
                    Ok(SourcedEntry {
                        entry: Self::entry_from_row(row)?,
                        feed_name: row.get(9)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn has_entries_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM feed_entries e
                 JOIN feed_sources s ON e.feed_source_id = s.id
                 WHERE s.user_id = ?1 AND e.published_at < ?2
             )",
            params![user_id, Self::format_datetime(&cutoff)],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn mark_all_seen(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE feed_entries SET is_new = 0
             WHERE is_new = 1
               AND feed_source_id IN (SELECT id FROM feed_sources WHERE user_id = ?1)",
            params![user_id],
        )?;

        Ok(updated)
    }

    fn delete_entries_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM feed_entries WHERE published_at < ?1",
            params![Self::format_datetime(&cutoff)],
        )?;

        Ok(deleted)
    }
}
