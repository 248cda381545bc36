pub mod history;
pub mod movie;

pub use history::{HistoryItem, UserId};
pub use movie::{
    Candidate, DiscoverFilter, Mood, MovieDetails, TmdbGenre, TmdbId, TmdbMovie,
    TmdbMovieDetails, TmdbPage, TmdbPerson,
};
