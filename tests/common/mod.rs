#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use firepulse_api::{
    error::{AppError, AppResult},
    models::{Candidate, DiscoverFilter, HistoryItem, Mood, MovieDetails, TmdbId, UserId},
    services::{HistoryStore, MovieLookup},
    AppState,
};

/// In-memory users and watch histories keyed by email
#[derive(Default)]
pub struct FakeHistory {
    users: HashMap<String, UserId>,
    histories: Mutex<HashMap<UserId, Vec<HistoryItem>>>,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, email: &str, user_id: UserId, history: Vec<HistoryItem>) -> Self {
        self.users.insert(email.to_string(), user_id);
        self.histories.lock().unwrap().insert(user_id, history);
        self
    }
}

#[async_trait::async_trait]
impl HistoryStore for FakeHistory {
    async fn resolve_user(&self, identifier: &str) -> AppResult<Option<UserId>> {
        Ok(self.users.get(identifier).copied())
    }

    async fn get_history(&self, user_id: UserId) -> AppResult<Vec<HistoryItem>> {
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_watch(&self, user_id: UserId, movie: &MovieDetails) -> AppResult<HistoryItem> {
        let item = HistoryItem {
            tmdb_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            watched_at: Some(chrono::Utc::now()),
        };

        let mut histories = self.histories.lock().unwrap();
        let history = histories.entry(user_id).or_default();
        history.retain(|existing| existing.tmdb_id != movie.id);
        history.insert(0, item.clone());

        Ok(item)
    }
}

/// Canned TMDB answers
#[derive(Default)]
pub struct FakeLookup {
    pub recommendations: HashMap<TmdbId, Vec<Candidate>>,
    pub mood_movies: Vec<Candidate>,
    /// Person name -> (person id, their movies)
    pub people: HashMap<String, (i64, Vec<Candidate>)>,
    /// Lowercased title -> details
    pub movies: HashMap<String, MovieDetails>,
    /// Person search answers like TMDB being down
    pub person_search_unavailable: bool,
    /// Fetching a person's movies answers like TMDB being down
    pub person_movies_unavailable: bool,
    /// Catalog for genre discovery, matched on `genre_ids`
    pub genre_movies: Vec<Candidate>,
    /// Original language -> themed discover results
    pub themed_movies: HashMap<String, Vec<Candidate>>,
    pub now_playing: Vec<Candidate>,
}

fn unavailable() -> AppError {
    AppError::Upstream {
        status: 503,
        body: String::new(),
    }
}

#[async_trait::async_trait]
impl MovieLookup for FakeLookup {
    async fn recommendations_for(&self, tmdb_id: TmdbId) -> AppResult<Vec<Candidate>> {
        Ok(self
            .recommendations
            .get(&tmdb_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn by_mood(&self, _mood: Mood) -> AppResult<Vec<Candidate>> {
        Ok(self.mood_movies.clone())
    }

    async fn by_genres(&self, genre_ids: &[i64]) -> AppResult<Vec<Candidate>> {
        Ok(self
            .genre_movies
            .iter()
            .filter(|m| m.genre_ids.iter().any(|g| genre_ids.contains(g)))
            .cloned()
            .collect())
    }

    async fn themed(
        &self,
        language: &str,
        _filter: DiscoverFilter,
        _page: u32,
    ) -> AppResult<Vec<Candidate>> {
        Ok(self
            .themed_movies
            .get(language)
            .cloned()
            .unwrap_or_default())
    }

    async fn now_playing(&self) -> AppResult<Vec<Candidate>> {
        Ok(self.now_playing.clone())
    }

    async fn search_person(&self, name: &str) -> AppResult<Option<i64>> {
        if self.person_search_unavailable {
            return Err(unavailable());
        }
        Ok(self.people.get(name).map(|(id, _)| *id))
    }

    async fn movies_by_person(&self, person_id: i64) -> AppResult<Vec<Candidate>> {
        if self.person_movies_unavailable {
            return Err(unavailable());
        }
        Ok(self
            .people
            .values()
            .find(|(id, _)| *id == person_id)
            .map(|(_, movies)| movies.clone())
            .unwrap_or_default())
    }

    async fn search_movie(&self, name: &str) -> AppResult<Option<TmdbId>> {
        Ok(self.movies.get(&name.to_lowercase()).map(|m| m.id))
    }

    async fn movie_details(&self, tmdb_id: TmdbId) -> AppResult<Option<MovieDetails>> {
        Ok(self.movies.values().find(|m| m.id == tmdb_id).cloned())
    }
}

pub fn candidate(id: TmdbId, title: &str) -> Candidate {
    Candidate::new(id, title)
}

/// alice (history: 1 "X") and bob (history: 2 "Y"); seed 1 recommends [3, 1],
/// seed 2 recommends [3, 2]
pub fn movie_night() -> (FakeHistory, FakeLookup) {
    let history = FakeHistory::new()
        .with_user("alice@x.com", 1, vec![HistoryItem::new(1, "X")])
        .with_user("bob@x.com", 2, vec![HistoryItem::new(2, "Y")])
        .with_user("carol@x.com", 3, Vec::new());

    let lookup = FakeLookup {
        recommendations: HashMap::from([
            (1, vec![candidate(3, "Z"), candidate(1, "X")]),
            (2, vec![candidate(3, "Z"), candidate(2, "Y")]),
        ]),
        mood_movies: vec![candidate(50, "Airplane!")],
        ..FakeLookup::default()
    };

    (history, lookup)
}

pub fn app_state(history: FakeHistory, lookup: FakeLookup) -> AppState {
    AppState::new(
        Arc::new(history),
        Arc::new(lookup),
        Mood::Comedy,
        Duration::from_secs(5),
    )
}
