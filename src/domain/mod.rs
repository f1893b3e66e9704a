pub mod feed;
pub mod item;

use thiserror::Error;

pub use feed::{FeedSource, NewFeedSource};
pub use item::{CandidateEntry, FeedEntry, SourcedEntry};

/// Rejections raised before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("feed entry title is empty")]
    EmptyTitle,

    #[error("feed entry link is empty")]
    EmptyLink,

    #[error("feed source id must be positive, got {0}")]
    InvalidFeedSourceId(i64),

    #[error("feed name is empty")]
    EmptyName,

    #[error("feed URL is empty")]
    EmptyUrl,

    #[error("feed URL must use http or https: {0}")]
    UnsupportedScheme(String),

    #[error("user id must be positive, got {0}")]
    InvalidUserId(i64),
}
