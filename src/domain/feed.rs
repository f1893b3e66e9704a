use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A syndication endpoint subscribed to by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A subscription that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedSource {
    pub user_id: i64,
    pub name: String,
    pub url: String,
}

impl NewFeedSource {
    pub fn new(user_id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into().trim().to_string(),
            url: url.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.user_id <= 0 {
            return Err(ValidationError::InvalidUserId(self.user_id));
        }
        Ok(())
    }
}
