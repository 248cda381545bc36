use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, HistoryItem, UserId},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct WatchedMovie {
    pub movie_name: String,
}

#[derive(Debug, Serialize)]
pub struct LogWatchResponse {
    pub message: String,
    pub item: HistoryItem,
}

const HISTORY_RECOMMENDATION_LIMIT: usize = 15;

#[derive(Debug, Serialize)]
pub struct HistoryRecommendations {
    pub recommending_based_on: String,
    pub suggestions: Vec<Candidate>,
}

async fn require_user(state: &AppState, email: &str) -> AppResult<UserId> {
    state
        .history
        .resolve_user(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user registered as '{}'", email)))
}

/// Logs a watched movie (looked up by name on TMDB) to a user's history
pub async fn log_watch(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(watched): Json<WatchedMovie>,
) -> AppResult<Json<LogWatchResponse>> {
    let movie_name = watched.movie_name.trim();
    if movie_name.is_empty() {
        return Err(AppError::InvalidInput("movie_name cannot be empty".to_string()));
    }

    let user_id = require_user(&state, &email).await?;

    let tmdb_id = state.lookup.search_movie(movie_name).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Could not find a confident match for a movie named '{}'. Please try a more specific title.",
            movie_name
        ))
    })?;

    let details = state.lookup.movie_details(tmdb_id).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Found a match for '{}' but could not fetch its details.",
            movie_name
        ))
    })?;

    let item = state.history.record_watch(user_id, &details).await?;

    Ok(Json(LogWatchResponse {
        message: format!(
            "Successfully logged '{}' to {}'s watch history.",
            item.title, email
        ),
        item,
    }))
}

/// A user's watch history, most recent first
pub async fn list_history(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<HistoryItem>>> {
    let user_id = require_user(&state, &email).await?;
    let items = state.history.get_history(user_id).await?;
    Ok(Json(items))
}

/// Movies sharing genres with the user's most recently watched movie
pub async fn recommend_from_history(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<HistoryRecommendations>> {
    let user_id = require_user(&state, &email).await?;
    let items = state.history.get_history(user_id).await?;

    let last = items.into_iter().next().ok_or_else(|| {
        AppError::NotFound(format!("No watch history found for user '{}'.", email))
    })?;
    if last.genres.is_empty() {
        return Err(AppError::NotFound(
            "Last watched movie has no genre information.".to_string(),
        ));
    }

    let suggestions: Vec<Candidate> = state
        .lookup
        .by_genres(&last.genres)
        .await?
        .into_iter()
        .filter(|m| m.id != last.tmdb_id)
        .take(HISTORY_RECOMMENDATION_LIMIT)
        .collect();

    tracing::info!(
        user = %email,
        based_on = last.tmdb_id,
        results = suggestions.len(),
        "Recommended from watch history"
    );

    Ok(Json(HistoryRecommendations {
        recommending_based_on: format!("your last watched movie: '{}'", last.title),
        suggestions,
    }))
}
