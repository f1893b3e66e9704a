use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A stored article, unique per (feed_source_id, link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: i64,
    pub feed_source_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry joined with the display name of its feed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedEntry {
    pub entry: FeedEntry,
    pub feed_name: String,
}

/// A normalized item on its way into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub feed_source_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
}

impl CandidateEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.link.is_empty() {
            return Err(ValidationError::EmptyLink);
        }
        if self.feed_source_id <= 0 {
            return Err(ValidationError::InvalidFeedSourceId(self.feed_source_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> CandidateEntry {
        CandidateEntry {
            feed_source_id: 1,
            title: "Release notes".into(),
            description: "What changed".into(),
            link: "https://example.com/release".into(),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_candidate() {
        assert!(candidate().validate().is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let entry = CandidateEntry {
            title: String::new(),
            ..candidate()
        };
        assert_eq!(entry.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_empty_link_rejected() {
        let entry = CandidateEntry {
            link: String::new(),
            ..candidate()
        };
        assert_eq!(entry.validate(), Err(ValidationError::EmptyLink));
    }

    #[test]
    fn test_feed_source_id_must_be_positive() {
        let entry = CandidateEntry {
            feed_source_id: 0,
            ..candidate()
        };
        assert_eq!(entry.validate(), Err(ValidationError::InvalidFeedSourceId(0)));
    }

    #[test]
    fn test_empty_description_is_allowed() {
        let entry = CandidateEntry {
            description: String::new(),
            ..candidate()
        };
        assert!(entry.validate().is_ok());
    }
}
