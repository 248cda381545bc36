/// Group watch-party suggestions
///
/// Every movie any member has watched becomes a seed. Recommendations for all
/// seeds are fetched concurrently, pooled in seed order, deduplicated by TMDB id
/// and filtered against everything the group has already seen; one survivor is
/// picked uniformly at random.
///
/// Failures are absorbed per member and per seed: a member whose history cannot
/// be read, or a seed whose lookup fails, contributes nothing instead of failing
/// the whole suggestion.
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::{
    error::AppResult,
    models::{Candidate, HistoryItem, Mood, TmdbId},
    services::{history::HistoryStore, providers::MovieLookup},
};

/// Outcome of a group suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// A movie title to watch
    Title(String),
    /// Nobody has history and the mood fallback came back empty
    NothingFound,
    /// The group has history but no seed produced any recommendation
    NoRecommendations,
    /// Every recommendation was something the group already watched
    AllSeen,
}

impl Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suggestion::Title(title) => write!(f, "{}", title),
            Suggestion::NothingFound => write!(f, "No suggestion found."),
            Suggestion::NoRecommendations => write!(
                f,
                "Could not find any recommendations based on your group's history."
            ),
            Suggestion::AllSeen => write!(
                f,
                "Found some recommendations, but you've seen them all! Try logging more movies."
            ),
        }
    }
}

/// Aggregates a party's watch histories into a single suggestion
pub struct GroupSuggester {
    history: Arc<dyn HistoryStore>,
    lookup: Arc<dyn MovieLookup>,
    fallback_mood: Mood,
    deadline: Duration,
}

impl GroupSuggester {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        lookup: Arc<dyn MovieLookup>,
        fallback_mood: Mood,
        deadline: Duration,
    ) -> Self {
        Self {
            history,
            lookup,
            fallback_mood,
            deadline,
        }
    }

    /// Suggests one movie nobody in `member_ids` has watched.
    ///
    /// The configured deadline bounds the whole call: history reads, seed
    /// lookups and the mood fallback all share it.
    pub async fn suggest(&self, member_ids: &[String]) -> Suggestion {
        let deadline = Instant::now() + self.deadline;

        let histories = self.collect_histories(member_ids, deadline).await;
        let seeds: Vec<TmdbId> = histories.iter().map(|item| item.tmdb_id).collect();

        if seeds.is_empty() {
            tracing::info!(
                members = member_ids.len(),
                mood = %self.fallback_mood,
                "No group history, falling back to mood suggestion"
            );
            return self.fallback(deadline).await;
        }

        let watched: HashSet<TmdbId> = seeds.iter().copied().collect();

        tracing::info!(
            members = member_ids.len(),
            seeds = seeds.len(),
            "Fetching recommendations for seed movies"
        );
        let pool = self.fan_out(&seeds, deadline).await;
        let pool_size = pool.len();

        let fresh = filter_unseen(pool, &watched);

        tracing::info!(
            pooled = pool_size,
            unseen = fresh.len(),
            "Group recommendation pool built"
        );

        if fresh.is_empty() {
            return if pool_size == 0 {
                Suggestion::NoRecommendations
            } else {
                Suggestion::AllSeen
            };
        }

        pick(&fresh)
            .map(|movie| Suggestion::Title(movie.title.clone()))
            .unwrap_or(Suggestion::NothingFound)
    }

    /// Combined history of every member that resolves to a user, in member order.
    ///
    /// Members whose history is not in by `deadline` contribute nothing.
    async fn collect_histories(
        &self,
        member_ids: &[String],
        deadline: Instant,
    ) -> Vec<HistoryItem> {
        let mut slots: Vec<Vec<HistoryItem>> = vec![Vec::new(); member_ids.len()];
        let mut tasks = JoinSet::new();

        for (slot, member) in member_ids.iter().enumerate() {
            let history = Arc::clone(&self.history);
            let member = member.clone();
            tasks.spawn(async move {
                let result = member_history(history.as_ref(), &member).await;
                (slot, member, result)
            });
        }

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((slot, _, Ok(items))))) => slots[slot] = items,
                Ok(Some(Ok((_, member, Err(e))))) => {
                    tracing::warn!(member = %member, error = %e, "History fetch failed, skipping member");
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "History fetch task did not complete");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        outstanding = tasks.len(),
                        "Suggestion deadline reached while reading histories"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Looks up every seed concurrently and flattens the results in seed order.
    ///
    /// Each seed owns one slot; slots whose task failed, panicked or missed the
    /// deadline stay empty.
    async fn fan_out(&self, seeds: &[TmdbId], deadline: Instant) -> Vec<Candidate> {
        let mut slots: Vec<Option<Vec<Candidate>>> = vec![None; seeds.len()];
        let mut tasks = JoinSet::new();

        for (slot, &seed) in seeds.iter().enumerate() {
            let lookup = Arc::clone(&self.lookup);
            tasks.spawn(async move { (slot, seed, lookup.recommendations_for(seed).await) });
        }

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((slot, _, Ok(movies))))) => slots[slot] = Some(movies),
                Ok(Some(Ok((_, seed, Err(e))))) => {
                    tracing::warn!(seed, error = %e, "Seed lookup failed, contributing nothing");
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(error = %e, "Seed lookup task did not complete");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        outstanding = tasks.len(),
                        deadline_ms = self.deadline.as_millis() as u64,
                        "Suggestion deadline reached, abandoning remaining seed lookups"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        slots.into_iter().flatten().flatten().collect()
    }

    async fn fallback(&self, deadline: Instant) -> Suggestion {
        let lookup = self.lookup.by_mood(self.fallback_mood);
        let movies = match tokio::time::timeout_at(deadline, lookup).await {
            Ok(Ok(movies)) => movies,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Mood fallback lookup failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Suggestion deadline reached during mood fallback");
                Vec::new()
            }
        };

        pick(&movies)
            .map(|movie| Suggestion::Title(movie.title.clone()))
            .unwrap_or(Suggestion::NothingFound)
    }
}

async fn member_history(history: &dyn HistoryStore, member: &str) -> AppResult<Vec<HistoryItem>> {
    match history.resolve_user(member).await? {
        Some(user_id) => history.get_history(user_id).await,
        None => {
            tracing::debug!(member = %member, "Member does not resolve to a user");
            Ok(Vec::new())
        }
    }
}

/// Drops candidates already watched and repeats of an id, keeping the first
/// occurrence of each
fn filter_unseen(pool: Vec<Candidate>, watched: &HashSet<TmdbId>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|movie| !watched.contains(&movie.id) && seen.insert(movie.id))
        .collect()
}

fn pick(movies: &[Candidate]) -> Option<&Candidate> {
    movies.choose(&mut rand::rng())
}
