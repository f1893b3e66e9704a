//! # Feedline
//!
//! Collects syndication feeds for many users and serves them back as a
//! timeline grouped by calendar day.
//!
//! ## Architecture
//!
//! ```text
//! refresh:  Fetcher → Normalizer → Store (upsert keyed by feed + link)
//! read:     Store → window query → day buckets → mark seen
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Subscribe
//! feedline add "Rust Blog" https://blog.rust-lang.org/feed.xml
//!
//! # Fetch everything
//! feedline refresh
//!
//! # Newest 60 days, then the 60 before that
//! feedline page
//! feedline page --offset 60
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Feed sources and entries
//! - [`engine`]: Refresh, paging and subscription management
//! - [`fetcher`]: HTTP fetching and feed parsing
//! - [`ingest`]: Parallel ingestion and retention
//! - [`normalizer`]: Date and content normalization
//! - [`pagination`]: Windowed, day-grouped reads
//! - [`store`]: Database persistence

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the configured store and
/// HTTP fetcher into a [`FeedEngine`](engine::FeedEngine).
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/feedline/config.toml`: database location, viewer
/// time zone, fetch limits and retention.
pub mod config;

/// Command-line interface using clap.
pub mod cli;

/// Core domain models.
///
/// - [`FeedSource`](domain::FeedSource): one subscription of one user
/// - [`FeedEntry`](domain::FeedEntry): a stored item, unique per source and link
/// - [`CandidateEntry`](domain::CandidateEntry): a normalized item awaiting upsert
pub mod domain;

/// The facade used by the CLI and by embedders.
pub mod engine;

/// HTTP fetching and feed parsing.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Refresh pipeline.
///
/// - [`ParallelIngestor`](ingest::ParallelIngestor): bounded concurrent ingestion
/// - [`RetentionSweeper`](ingest::RetentionSweeper): throttled deletion of old entries
pub mod ingest;

/// Turns raw feed items into candidates: tolerant date parsing and markup
/// stripping.
pub mod normalizer;

/// Fixed 60-day windows of entries, bucketed by local calendar day.
pub mod pagination;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
