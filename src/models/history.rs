use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::movie::TmdbId;

/// Primary key of a row in `users`
pub type UserId = i32;

/// One entry of a user's watch history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub tmdb_id: TmdbId,
    pub title: String,
    /// TMDB genre ids
    pub genres: Vec<i64>,
    pub watched_at: Option<DateTime<Utc>>,
}

impl HistoryItem {
    pub fn new(tmdb_id: TmdbId, title: impl Into<String>) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
            genres: Vec::new(),
            watched_at: None,
        }
    }
}
