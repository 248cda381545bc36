/// Time-of-day movie picks
///
/// The local hour picks a theme. English and Hindi discover pages are fetched
/// for the theme's genres and keywords alongside what is now playing, then
/// mixed: a few current releases, Hindi picks, and English picks to fill up.
use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Candidate, DiscoverFilter, TmdbId},
    services::providers::MovieLookup,
};

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

const THEME_LANGUAGES: [&str; 2] = ["en", "hi"];
const LATEST_SHARE: usize = 3;
const HINDI_SHARE: usize = 9;
const TOTAL_PICKS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl TimeSlot {
    /// Slot for a local hour (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => TimeSlot::Morning,
            11..=15 => TimeSlot::Afternoon,
            16..=19 => TimeSlot::Evening,
            2..=4 => TimeSlot::LateNight,
            _ => TimeSlot::Night,
        }
    }

    pub fn genres(self) -> &'static str {
        match self {
            TimeSlot::Morning => "35|18",
            TimeSlot::Afternoon => "10751|35",
            TimeSlot::Evening => "28|53|80",
            TimeSlot::Night => "27|9648",
            TimeSlot::LateNight => "18|10749",
        }
    }

    pub fn keywords(self) -> &'static str {
        match self {
            TimeSlot::Morning => "9749|1804",
            TimeSlot::Afternoon => "818|9749",
            TimeSlot::Evening => "9799|4344",
            TimeSlot::Night => "10402|9663",
            TimeSlot::LateNight => "225091|534",
        }
    }

    pub fn greetings(self) -> &'static [&'static str] {
        match self {
            TimeSlot::Morning => &[
                "☀️ Good Morning! Kickstart your day with these picks.",
                "🌞 Rise and shine! Movies to brighten your morning.",
                "☕ Grab your coffee! Here are some fresh movies to start your day.",
            ],
            TimeSlot::Afternoon => &[
                "🍿 Good afternoon! Enjoy these feel-good movies.",
                "🌤️ Afternoon delight: Check out these films.",
                "🕛 Taking a break? Here's some entertainment for your afternoon.",
            ],
            TimeSlot::Evening => &[
                "🌆 Evening vibes? Here are some thrilling suggestions.",
                "🌇 Wind down your day with these exciting movies.",
                "🎬 The sun is setting, and the stage is set for these great films.",
            ],
            TimeSlot::Night => &[
                "🌙 Night owl? Dive into these mysteries and horrors.",
                "🦉 Late night thrills await you here.",
                "🌌 The night is dark and full of movies. Here are some to explore.",
            ],
            TimeSlot::LateNight => &[
                "🌌 Late night calm? Relax with these dramas and romances.",
                "🌠 Quiet night? These movies set the mood.",
                "🛋️ Cozy up on the couch with these soothing late-night stories.",
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSuggestions {
    pub timezone_used: String,
    pub current_hour_in_timezone: u32,
    pub time_slot: TimeSlot,
    pub greeting: String,
    pub suggestions: Vec<Candidate>,
}

/// Resolves an IANA timezone name, falling back to [`DEFAULT_TIMEZONE`]
pub fn resolve_timezone(name: &str) -> (Tz, String) {
    match name.parse::<Tz>() {
        Ok(tz) => (tz, name.to_string()),
        Err(_) => {
            tracing::debug!(timezone = %name, "Unknown timezone, using default");
            (chrono_tz::Asia::Kolkata, DEFAULT_TIMEZONE.to_string())
        }
    }
}

/// Themed picks for the hour `now` falls on in `timezone`
pub async fn suggest_for_time(
    lookup: &dyn MovieLookup,
    timezone: &str,
    now: DateTime<Utc>,
) -> TimeSuggestions {
    let (tz, timezone_used) = resolve_timezone(timezone);
    let hour = now.with_timezone(&tz).hour();
    let slot = TimeSlot::from_hour(hour);

    let (greeting, page) = {
        let mut rng = rand::rng();
        let greeting = slot
            .greetings()
            .choose(&mut rng)
            .copied()
            .unwrap_or("Here are some great picks for you!");
        (greeting.to_string(), rng.random_range(1..=5))
    };

    let queries = THEME_LANGUAGES.iter().flat_map(|&language| {
        [
            DiscoverFilter::Genres(slot.genres()),
            DiscoverFilter::Keywords(slot.keywords()),
        ]
        .map(move |filter| (language, filter))
    });
    let themed = join_all(queries.map(|(language, filter)| async move {
        let result = lookup.themed(language, filter, page).await;
        or_empty(result, "Themed discover failed")
    }));

    let (themed, latest) = tokio::join!(themed, async {
        or_empty(lookup.now_playing().await, "Now playing lookup failed")
    });

    let suggestions = mix_pools(themed.into_iter().flatten().collect(), latest);

    tracing::info!(
        timezone = %timezone_used,
        hour,
        slot = ?slot,
        results = suggestions.len(),
        "Time-based suggestions ready"
    );

    TimeSuggestions {
        timezone_used,
        current_hour_in_timezone: hour,
        time_slot: slot,
        greeting,
        suggestions,
    }
}

fn or_empty(result: AppResult<Vec<Candidate>>, context: &str) -> Vec<Candidate> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "{}", context);
        Vec::new()
    })
}

/// Mixes deduplicated results into at most [`TOTAL_PICKS`] movies: up to
/// [`LATEST_SHARE`] current releases, Hindi movies up to [`HINDI_SHARE`] in
/// total, then English movies.
fn mix_pools(themed: Vec<Candidate>, latest: Vec<Candidate>) -> Vec<Candidate> {
    let latest_ids: HashSet<TmdbId> = latest.iter().map(|m| m.id).collect();

    let mut unique_ids = HashSet::new();
    let unique: Vec<Candidate> = themed
        .into_iter()
        .chain(latest)
        .filter(|m| unique_ids.insert(m.id))
        .collect();

    let in_language = |language: &str| -> Vec<Candidate> {
        unique
            .iter()
            .filter(|m| m.original_language.as_deref() == Some(language))
            .cloned()
            .collect()
    };
    let pools = [
        (
            unique
                .iter()
                .filter(|m| latest_ids.contains(&m.id))
                .cloned()
                .collect::<Vec<_>>(),
            LATEST_SHARE,
        ),
        (in_language("hi"), HINDI_SHARE),
        (in_language("en"), TOTAL_PICKS),
    ];

    let mut rng = rand::rng();
    let mut picked: Vec<Candidate> = Vec::new();
    let mut taken = HashSet::new();

    for (mut pool, cap) in pools {
        pool.shuffle(&mut rng);
        for movie in pool {
            if picked.len() >= cap {
                break;
            }
            if taken.insert(movie.id) {
                picked.push(movie);
            }
        }
    }

    picked.shuffle(&mut rng);
    picked
}
