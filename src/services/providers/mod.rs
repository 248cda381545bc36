/// Movie metadata providers
///
/// The rest of the crate talks to TMDB (or a test double) only through the
/// [`MovieLookup`] trait.
use crate::{
    error::AppResult,
    models::{Candidate, DiscoverFilter, Mood, MovieDetails, TmdbId},
};

pub mod retry;
pub mod tmdb;

pub use retry::RetryPolicy;
pub use tmdb::TmdbProvider;

/// Movie lookup service
///
/// `recommendations_for` applies its own bounded retry on transient failures
/// and returns an empty list once retries are exhausted; it only returns an
/// error for failures that retrying cannot fix.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieLookup: Send + Sync {
    /// Movies related to a watched movie
    async fn recommendations_for(&self, tmdb_id: TmdbId) -> AppResult<Vec<Candidate>>;

    /// A short, shuffled list of popular movies in the mood's genre
    async fn by_mood(&self, mood: Mood) -> AppResult<Vec<Candidate>>;

    /// Popular movies sharing any of `genre_ids`, from a random results page
    async fn by_genres(&self, genre_ids: &[i64]) -> AppResult<Vec<Candidate>>;

    /// One discover page of popular movies in an original language, narrowed
    /// by `filter`
    async fn themed(
        &self,
        language: &str,
        filter: DiscoverFilter,
        page: u32,
    ) -> AppResult<Vec<Candidate>>;

    /// Movies currently in theatres
    async fn now_playing(&self) -> AppResult<Vec<Candidate>>;

    /// TMDB person id of the best match for an actor/director name
    async fn search_person(&self, name: &str) -> AppResult<Option<i64>>;

    /// Most popular movies featuring a person
    async fn movies_by_person(&self, person_id: i64) -> AppResult<Vec<Candidate>>;

    /// TMDB id of the movie whose title best matches `name`
    async fn search_movie(&self, name: &str) -> AppResult<Option<TmdbId>>;

    /// Title and genres of a movie
    async fn movie_details(&self, tmdb_id: TmdbId) -> AppResult<Option<MovieDetails>>;
}
