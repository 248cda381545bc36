use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use crate::{
    error::AppResult,
    models::{HistoryItem, MovieDetails, UserId},
};

/// Persistent watch history, read by the group suggestion engine
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Looks up a user by identifier (email); `None` if no such user
    async fn resolve_user(&self, identifier: &str) -> AppResult<Option<UserId>>;

    /// The user's watch history, most recent first
    async fn get_history(&self, user_id: UserId) -> AppResult<Vec<HistoryItem>>;

    /// Adds a movie to the user's history, or refreshes its watch time if it
    /// is already there
    async fn record_watch(&self, user_id: UserId, movie: &MovieDetails) -> AppResult<HistoryItem>;
}

/// Postgres-backed history over the `users` and `movie_history` tables
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    tmdb_id: i32,
    movie_title: String,
    genres: Option<Json<Vec<i64>>>,
    watched_at: Option<DateTime<Utc>>,
}

impl From<HistoryRow> for HistoryItem {
    fn from(row: HistoryRow) -> Self {
        HistoryItem {
            tmdb_id: i64::from(row.tmdb_id),
            title: row.movie_title,
            genres: row.genres.map(|Json(genres)| genres).unwrap_or_default(),
            watched_at: row.watched_at,
        }
    }
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HistoryStore for PgHistoryStore {
    async fn resolve_user(&self, identifier: &str) -> AppResult<Option<UserId>> {
        let user_id = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user_id)
    }

    async fn get_history(&self, user_id: UserId) -> AppResult<Vec<HistoryItem>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT tmdb_id, movie_title, genres, watched_at
            FROM movie_history
            WHERE user_id = $1
            ORDER BY watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HistoryItem::from).collect())
    }

    async fn record_watch(&self, user_id: UserId, movie: &MovieDetails) -> AppResult<HistoryItem> {
        let tmdb_id = i32::try_from(movie.id).map_err(|_| {
            crate::error::AppError::InvalidInput(format!("TMDB id {} out of range", movie.id))
        })?;

        let refreshed = sqlx::query_as::<_, HistoryRow>(
            r#"
            UPDATE movie_history
            SET watched_at = now()
            WHERE user_id = $1 AND tmdb_id = $2
            RETURNING tmdb_id, movie_title, genres, watched_at
            "#,
        )
        .bind(user_id)
        .bind(tmdb_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = refreshed {
            tracing::debug!(user_id, tmdb_id, "Refreshed existing history entry");
            return Ok(row.into());
        }

        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            INSERT INTO movie_history (user_id, movie_title, tmdb_id, genres)
            VALUES ($1, $2, $3, $4)
            RETURNING tmdb_id, movie_title, genres, watched_at
            "#,
        )
        .bind(user_id)
        .bind(&movie.title)
        .bind(tmdb_id)
        .bind(Json(&movie.genres))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id, tmdb_id, title = %movie.title, "Recorded watch");

        Ok(row.into())
    }
}
