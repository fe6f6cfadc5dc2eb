//! Keyword extraction over plain text.
//!
//! Two flavors: a frequency-ranked list used when generating tag
//! suggestions offline, and a stopword-filtered set used by the
//! relatedness heuristic.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from",
        "up", "about", "into", "through", "during", "before", "after", "above", "below",
        "between", "among", "within", "without", "this", "that", "these", "those", "is", "are",
        "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
        "would", "could", "should", "may", "might", "must", "can", "shall", "a", "an", "it",
        "its", "i", "you", "he", "she", "we", "they",
    ]
    .into_iter()
    .collect()
});

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Stopword-filtered keyword set: lowercase ASCII words of at least
/// `min_length` characters.
pub fn keyword_set(text: &str, min_length: usize) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|w| w.len() >= min_length && !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}

/// Top keywords by frequency, most frequent first. Ties break
/// alphabetically so the output is deterministic.
pub fn top_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(w))
    {
        *freq.entry(word.to_string()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(max_keywords);
    ranked.into_iter().map(|(w, _)| w).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_filters_stopwords_and_short_words() {
        let set = keyword_set("The quick brown fox is in the garden", 4);
        assert!(set.contains("quick"));
        assert!(set.contains("brown"));
        assert!(set.contains("garden"));
        assert!(!set.contains("the"));
        assert!(!set.contains("fox"));
        assert!(!set.contains("is"));
    }

    #[test]
    fn test_keyword_set_lowercases() {
        let set = keyword_set("Rust RUST rust", 4);
        assert_eq!(set.len(), 1);
        assert!(set.contains("rust"));
    }

    #[test]
    fn test_top_keywords_ranked_by_frequency() {
        let text = "rust rust rust async async database";
        let top = top_keywords(text, 2);
        assert_eq!(top, vec!["rust", "async"]);
    }

    #[test]
    fn test_top_keywords_deterministic_tie_break() {
        let top = top_keywords("zebra apple zebra apple", 2);
        assert_eq!(top, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_top_keywords_empty_text() {
        assert!(top_keywords("", 5).is_empty());
        assert!(top_keywords("a an the", 5).is_empty());
    }
}
