use crate::models::Mood;

fn keywords(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Action => &["action", "fight", "adventure", "stunt", "chase"],
        Mood::Comedy => &["comedy", "funny", "laugh", "hilarious", "jokes", "humor", "sitcom"],
        Mood::Drama => &[
            "drama", "sad", "unhappy", "depressed", "melancholy", "cry", "serious", "emotional",
        ],
        Mood::Romance => &[
            "romance", "love", "crush", "valentine", "affection", "date", "relationship",
            "romantic",
        ],
        Mood::Horror => &[
            "horror", "fear", "scared", "frightened", "terror", "creepy", "spooky", "ghost",
            "monster",
        ],
        Mood::Thriller => &[
            "thriller", "thrill", "suspense", "intense", "mystery", "detective",
            "edge-of-your-seat",
        ],
    }
}

/// Detects a movie mood from free text by substring keyword matching.
///
/// Moods are tried in [`Mood::ALL`] order, so "a funny action movie" is action.
pub fn extract_mood(text: &str) -> Option<Mood> {
    let text = text.to_lowercase();
    Mood::ALL
        .into_iter()
        .find(|mood| keywords(*mood).iter().any(|kw| text.contains(kw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_genre_name() {
        assert_eq!(extract_mood("Show me a HORROR film"), Some(Mood::Horror));
    }

    #[test]
    fn test_synonym_keyword() {
        assert_eq!(extract_mood("something hilarious please"), Some(Mood::Comedy));
        assert_eq!(extract_mood("I feel melancholy"), Some(Mood::Drama));
    }

    #[test]
    fn test_earlier_mood_wins() {
        assert_eq!(extract_mood("a funny action movie"), Some(Mood::Action));
    }

    #[test]
    fn test_no_keywords() {
        assert_eq!(extract_mood("whatever is on"), None);
    }
}
