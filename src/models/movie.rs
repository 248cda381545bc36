use serde::{Deserialize, Serialize};

/// TMDB catalog identifier
pub type TmdbId = i64;

/// A movie suggested by the lookup service
///
/// Candidates live only for the duration of one lookup or aggregation; they are
/// cached as JSON in Redis but never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: TmdbId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Candidate {
    /// Minimal candidate with only an id and title
    pub fn new(id: TmdbId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: None,
            poster_path: None,
            genre_ids: Vec::new(),
            original_language: None,
            release_date: None,
            vote_average: None,
        }
    }
}

/// Movie details needed to record a watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: TmdbId,
    pub title: String,
    pub genres: Vec<i64>,
}

/// Supported moods, each backed by one TMDB genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Action,
    Comedy,
    Drama,
    Romance,
    Horror,
    Thriller,
}

impl Mood {
    /// All moods in keyword-matching order
    pub const ALL: [Mood; 6] = [
        Mood::Action,
        Mood::Comedy,
        Mood::Drama,
        Mood::Romance,
        Mood::Horror,
        Mood::Thriller,
    ];

    pub fn genre_id(self) -> u32 {
        match self {
            Mood::Action => 28,
            Mood::Comedy => 35,
            Mood::Drama => 18,
            Mood::Romance => 10749,
            Mood::Horror => 27,
            Mood::Thriller => 53,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Action => "action",
            Mood::Comedy => "comedy",
            Mood::Drama => "drama",
            Mood::Romance => "romance",
            Mood::Horror => "horror",
            Mood::Thriller => "thriller",
        }
    }

    /// Parses a mood name, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Mood::ALL.into_iter().find(|mood| mood.as_str() == name)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constraint for a themed discover query, as `|`-separated TMDB ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverFilter {
    Genres(&'static str),
    Keywords(&'static str),
}

impl DiscoverFilter {
    /// Query parameter name and value for `/discover/movie`
    pub fn param(self) -> (&'static str, &'static str) {
        match self {
            DiscoverFilter::Genres(ids) => ("with_genres", ids),
            DiscoverFilter::Keywords(ids) => ("with_keywords", ids),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of TMDB list results (search, discover, recommendations)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Raw movie entry from TMDB list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: TmdbId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl From<TmdbMovie> for Candidate {
    fn from(movie: TmdbMovie) -> Self {
        Candidate {
            id: movie.id,
            title: movie.title.unwrap_or_else(|| "Untitled".to_string()),
            overview: movie.overview,
            poster_path: movie.poster_path,
            genre_ids: movie.genre_ids,
            original_language: movie.original_language,
            release_date: movie.release_date,
            vote_average: movie.vote_average,
        }
    }
}

/// Raw person entry from TMDB person search
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
}

/// Raw response from `/movie/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: TmdbId,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

impl From<TmdbMovieDetails> for MovieDetails {
    fn from(details: TmdbMovieDetails) -> Self {
        MovieDetails {
            id: details.id,
            title: details.title,
            genres: details.genres.into_iter().map(|g| g.id).collect(),
        }
    }
}
