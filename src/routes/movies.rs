use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::Candidate,
    services::{
        mood::extract_mood,
        time_suggest::{suggest_for_time, TimeSuggestions, DEFAULT_TIMEZONE},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct MovieQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MovieSuggestions {
    pub text: String,
    pub movies: Vec<Candidate>,
}

/// Movie chat bot: an actor/director's popular movies, or movies for a mood
pub async fn suggest_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MovieQuery>,
) -> AppResult<Json<MovieSuggestions>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
    }

    let person_name = title_case(query);
    let person = state
        .lookup
        .search_person(&person_name)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(request_id = %request_id, person = %person_name, error = %e, "Person search failed, trying mood");
            None
        });

    if let Some(person_id) = person {
        let movies = state
            .lookup
            .movies_by_person(person_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(request_id = %request_id, person_id, error = %e, "Fetching person's movies failed");
                Vec::new()
            });
        tracing::info!(
            request_id = %request_id,
            person = %person_name,
            results = movies.len(),
            "Answered person query"
        );

        let text = if movies.is_empty() {
            format!(
                "I found {}, but couldn't fetch their popular movies right now.",
                person_name
            )
        } else {
            format!(
                "Here are some popular movies with {}: {}",
                person_name,
                join_titles(&movies)
            )
        };
        return Ok(Json(MovieSuggestions { text, movies }));
    }

    let mood = extract_mood(query).ok_or_else(|| {
        AppError::NotFound(
            "Sorry, I couldn't find an actor/director by that name or understand the mood."
                .to_string(),
        )
    })?;

    let movies = state.lookup.by_mood(mood).await?;
    tracing::info!(
        request_id = %request_id,
        mood = %mood,
        results = movies.len(),
        "Answered mood query"
    );

    let text = if movies.is_empty() {
        "Sorry, I couldn't find any movie suggestions for that right now.".to_string()
    } else {
        format!(
            "Here are some {}-based movie recommendations: {}",
            mood,
            join_titles(&movies)
        )
    };

    Ok(Json(MovieSuggestions { text, movies }))
}

#[derive(Debug, Deserialize)]
pub struct TimeQuery {
    #[serde(default = "default_timezone")]
    pub user_timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Themed picks for the current hour in the caller's timezone
pub async fn time_based_suggestions(
    State(state): State<AppState>,
    Query(query): Query<TimeQuery>,
) -> Json<TimeSuggestions> {
    let suggestions =
        suggest_for_time(state.lookup.as_ref(), &query.user_timezone, chrono::Utc::now()).await;
    Json(suggestions)
}

fn join_titles(movies: &[Candidate]) -> String {
    movies
        .iter()
        .map(|m| m.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Capitalises the first letter of each word and lowercases the rest
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
