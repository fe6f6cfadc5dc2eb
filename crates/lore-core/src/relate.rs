//! Relatedness heuristic over stored content.
//!
//! Purely lexical: weighted Jaccard overlap of tags, title words and
//! summary keywords. No embeddings, no network.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::keywords::keyword_set;
use crate::models::ContentItem;

const TAG_WEIGHT: f64 = 0.6;
const TITLE_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.1;
const KEYWORD_MIN_LENGTH: usize = 4;

/// A related-content suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedItem {
    pub id: i64,
    pub title: String,
    pub file_path: String,
    pub score: f64,
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn title_words(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

fn summary_keywords(item: &ContentItem) -> HashSet<String> {
    match &item.summary {
        Some(s) => keyword_set(s, KEYWORD_MIN_LENGTH),
        None => HashSet::new(),
    }
}

/// Score how related two items are, in `[0.0, 1.0]`. Symmetric.
pub fn relatedness(a: &ContentItem, b: &ContentItem) -> f64 {
    let a_tags: HashSet<String> = a.tags.iter().cloned().collect();
    let b_tags: HashSet<String> = b.tags.iter().cloned().collect();

    let score = TAG_WEIGHT * jaccard(&a_tags, &b_tags)
        + TITLE_WEIGHT * jaccard(&title_words(&a.title), &title_words(&b.title))
        + KEYWORD_WEIGHT * jaccard(&summary_keywords(a), &summary_keywords(b));

    score.min(1.0)
}

/// Find items related to `source` among `candidates`.
///
/// The source itself and candidates scoring below `min_score` are
/// excluded. Results sort by score descending; ties break by
/// `created_at` descending, then id ascending, so output order is
/// deterministic.
pub fn find_related(
    source: &ContentItem,
    candidates: &[ContentItem],
    min_score: f64,
    max_results: usize,
) -> Vec<RelatedItem> {
    let mut scored: Vec<(&ContentItem, f64)> = candidates
        .iter()
        .filter(|c| c.id != source.id)
        .map(|c| (c, relatedness(source, c)))
        .filter(|(_, score)| *score >= min_score)
        .collect();

    scored.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    scored.truncate(max_results);

    scored
        .into_iter()
        .map(|(c, score)| RelatedItem {
            id: c.id,
            title: c.title.clone(),
            file_path: c.file_path.clone(),
            score,
        })
        .collect()
}
