pub mod group_suggest;
pub mod history;
pub mod mood;
pub mod providers;
pub mod time_suggest;

pub use group_suggest::{GroupSuggester, Suggestion};
pub use history::{HistoryStore, PgHistoryStore};
pub use providers::{MovieLookup, RetryPolicy, TmdbProvider};
