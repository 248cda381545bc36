use std::sync::Arc;
use std::time::Duration;

use crate::models::Mood;
use crate::party::PartyRegistry;
use crate::services::{GroupSuggester, HistoryStore, MovieLookup};

/// Shared application state
///
/// The party registry is owned here and handed to every session through the
/// router; there is no process-global registry.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PartyRegistry>,
    pub suggester: Arc<GroupSuggester>,
    pub lookup: Arc<dyn MovieLookup>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        lookup: Arc<dyn MovieLookup>,
        fallback_mood: Mood,
        suggest_deadline: Duration,
    ) -> Self {
        let suggester = GroupSuggester::new(
            Arc::clone(&history),
            Arc::clone(&lookup),
            fallback_mood,
            suggest_deadline,
        );

        Self {
            registry: Arc::new(PartyRegistry::new()),
            suggester: Arc::new(suggester),
            lookup,
            history,
        }
    }
}
