/// TMDB v3 provider
///
/// Endpoints used:
/// - `/movie/{id}/recommendations` for group suggestion seeds
/// - `/discover/movie` for mood, genre, time-of-day theme and person lookups
/// - `/movie/now_playing` for what is in theatres
/// - `/search/person`, `/search/movie` and `/movie/{id}` for the chat bot and
///   watch logging
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        Candidate, DiscoverFilter, Mood, MovieDetails, TmdbId, TmdbMovie, TmdbMovieDetails,
        TmdbPage, TmdbPerson,
    },
    services::providers::{MovieLookup, RetryPolicy},
};

const RECS_CACHE_TTL: u64 = 86400; // 1 day
const DISCOVER_CACHE_TTL: u64 = 3600; // 1 hour
const SEARCH_CACHE_TTL: u64 = 3600;
const DETAILS_CACHE_TTL: u64 = 604800; // 1 week

const MOOD_LANGUAGES: [&str; 2] = ["en", "hi"];
const NOW_PLAYING_REGION: &str = "IN";
const MIN_VOTE_COUNT: &str = "100";
const MOOD_RESULT_LIMIT: usize = 5;
const PERSON_RESULT_LIMIT: usize = 5;
const SEARCH_CANDIDATES: usize = 20;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
    retry: RetryPolicy,
}

impl TmdbProvider {
    /// Creates a provider whose HTTP requests time out after `request_timeout`
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        request_timeout: Duration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
            retry,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path = %path, status, "TMDB request failed");
            return Err(AppError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }

    async fn fetch_recommendations(&self, tmdb_id: TmdbId) -> AppResult<Vec<Candidate>> {
        let page: TmdbPage<TmdbMovie> = self
            .get_json(
                &format!("/movie/{}/recommendations", tmdb_id),
                &[("language", "en-US".to_string())],
            )
            .await?;

        Ok(page.results.into_iter().map(Candidate::from).collect())
    }

    async fn recommendations_cached(&self, tmdb_id: TmdbId) -> AppResult<Vec<Candidate>> {
        cached!(
            self.cache,
            CacheKey::Recommendations(tmdb_id),
            RECS_CACHE_TTL,
            self.retry
                .run("recommendations", move || self.fetch_recommendations(tmdb_id))
        )
    }

    async fn discover(&self, genre_id: u32, language: &str, page: u32) -> AppResult<Vec<Candidate>> {
        cached!(
            self.cache,
            CacheKey::Discover {
                genre_id,
                language: language.to_string(),
                page,
            },
            DISCOVER_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbMovie> = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_genres", genre_id.to_string()),
                            ("with_original_language", language.to_string()),
                            ("language", "en-US".to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                            ("page", page.to_string()),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(page.results.into_iter().map(Candidate::from).collect::<Vec<_>>())
            }
        )
    }
}

#[async_trait::async_trait]
impl MovieLookup for TmdbProvider {
    async fn recommendations_for(&self, tmdb_id: TmdbId) -> AppResult<Vec<Candidate>> {
        match self.recommendations_cached(tmdb_id).await {
            Ok(movies) => Ok(movies),
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    tmdb_id,
                    attempts = self.retry.max_attempts,
                    error = %e,
                    "Recommendation lookup exhausted retries"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn by_mood(&self, mood: Mood) -> AppResult<Vec<Candidate>> {
        let genre_id = mood.genre_id();
        let (en_page, hi_page) = {
            let mut rng = rand::rng();
            (rng.random_range(1..=5), rng.random_range(1..=5))
        };

        let (english, hindi) = tokio::join!(
            self.discover(genre_id, MOOD_LANGUAGES[0], en_page),
            self.discover(genre_id, MOOD_LANGUAGES[1], hi_page),
        );

        let mut combined = Vec::new();
        for (language, result) in MOOD_LANGUAGES.iter().zip([english, hindi]) {
            match result {
                Ok(movies) => combined.extend(movies),
                Err(e) => {
                    tracing::warn!(language, genre_id, error = %e, "Discover lookup failed");
                }
            }
        }

        combined.shuffle(&mut rand::rng());
        combined.truncate(MOOD_RESULT_LIMIT);

        tracing::info!(mood = %mood, results = combined.len(), "Mood lookup completed");

        Ok(combined)
    }

    async fn by_genres(&self, genre_ids: &[i64]) -> AppResult<Vec<Candidate>> {
        let genres = genre_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let page: u32 = rand::rng().random_range(1..=5);

        cached!(
            self.cache,
            CacheKey::GenreDiscover {
                genres: genres.clone(),
                page,
            },
            DISCOVER_CACHE_TTL,
            async move {
                let results: TmdbPage<TmdbMovie> = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_genres", genres),
                            ("language", "en-US".to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                            ("page", page.to_string()),
                            ("include_adult", "false".to_string()),
                            ("vote_count.gte", MIN_VOTE_COUNT.to_string()),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(
                    results
                        .results
                        .into_iter()
                        .map(Candidate::from)
                        .collect::<Vec<_>>(),
                )
            }
        )
    }

    async fn themed(
        &self,
        language: &str,
        filter: DiscoverFilter,
        page: u32,
    ) -> AppResult<Vec<Candidate>> {
        let (param, ids) = filter.param();

        cached!(
            self.cache,
            CacheKey::ThemedDiscover {
                filter: format!("{}={}", param, ids),
                language: language.to_string(),
                page,
            },
            DISCOVER_CACHE_TTL,
            async move {
                let results: TmdbPage<TmdbMovie> = self
                    .get_json(
                        "/discover/movie",
                        &[
                            (param, ids.to_string()),
                            ("with_original_language", language.to_string()),
                            ("language", "en-US".to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                            ("page", page.to_string()),
                            ("include_adult", "false".to_string()),
                            ("vote_count.gte", MIN_VOTE_COUNT.to_string()),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(
                    results
                        .results
                        .into_iter()
                        .map(Candidate::from)
                        .collect::<Vec<_>>(),
                )
            }
        )
    }

    async fn now_playing(&self) -> AppResult<Vec<Candidate>> {
        cached!(self.cache, CacheKey::NowPlaying, DISCOVER_CACHE_TTL, async move {
            let results: TmdbPage<TmdbMovie> = self
                .get_json(
                    "/movie/now_playing",
                    &[
                        ("language", "en-US".to_string()),
                        ("page", "1".to_string()),
                        ("region", NOW_PLAYING_REGION.to_string()),
                    ],
                )
                .await?;

            Ok::<_, AppError>(
                results
                    .results
                    .into_iter()
                    .map(Candidate::from)
                    .collect::<Vec<_>>(),
            )
        })
    }

    async fn search_person(&self, name: &str) -> AppResult<Option<i64>> {
        cached!(
            self.cache,
            CacheKey::PersonSearch(name.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbPerson> = self
                    .get_json("/search/person", &[("query", name.to_string())])
                    .await?;
                Ok::<_, AppError>(page.results.first().map(|person| person.id))
            }
        )
    }

    async fn movies_by_person(&self, person_id: i64) -> AppResult<Vec<Candidate>> {
        cached!(
            self.cache,
            CacheKey::PersonMovies(person_id),
            SEARCH_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbMovie> = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_people", person_id.to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(
                    page.results
                        .into_iter()
                        .take(PERSON_RESULT_LIMIT)
                        .map(Candidate::from)
                        .collect::<Vec<_>>(),
                )
            }
        )
    }

    async fn search_movie(&self, name: &str) -> AppResult<Option<TmdbId>> {
        cached!(
            self.cache,
            CacheKey::MovieSearch(name.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbMovie> = self
                    .get_json(
                        "/search/movie",
                        &[
                            ("query", name.to_string()),
                            ("language", "en-US".to_string()),
                            ("page", "1".to_string()),
                        ],
                    )
                    .await?;

                let best = best_title_match(name, &page.results);
                tracing::info!(query = %name, candidates = page.results.len(), matched = ?best, "Movie search completed");
                Ok::<_, AppError>(best)
            }
        )
    }

    async fn movie_details(&self, tmdb_id: TmdbId) -> AppResult<Option<MovieDetails>> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(tmdb_id),
            DETAILS_CACHE_TTL,
            async move {
                let result: AppResult<TmdbMovieDetails> = self
                    .get_json(
                        &format!("/movie/{}", tmdb_id),
                        &[("language", "en-US".to_string())],
                    )
                    .await;

                match result {
                    Ok(details) => Ok(Some(MovieDetails::from(details))),
                    Err(AppError::Upstream { status: 404, .. }) => Ok(None),
                    Err(e) => Err(e),
                }
            }
        )
    }
}

/// Lowercases and strips punctuation
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Picks the movie whose title best matches the query among the top search
/// results: an exact normalised match wins, then the first result whose title
/// contains the query (or is contained by it).
fn best_title_match(query: &str, movies: &[TmdbMovie]) -> Option<TmdbId> {
    let wanted = normalize(query);
    if wanted.is_empty() {
        return None;
    }

    let top = &movies[..movies.len().min(SEARCH_CANDIDATES)];
    let titled = || {
        top.iter()
            .filter_map(|m| m.title.as_deref().map(|t| (m.id, normalize(t))))
    };

    titled()
        .find(|(_, title)| *title == wanted)
        .or_else(|| {
            titled().find(|(_, title)| {
                !title.is_empty() && (title.contains(&wanted) || wanted.contains(title.as_str()))
            })
        })
        .map(|(id, _)| id)
}
