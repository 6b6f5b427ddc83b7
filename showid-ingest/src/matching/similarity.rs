//! Title similarity for fuzzy setlist matching
//!
//! Deliberately cheap and deterministic:
//! - identical normalised titles score 1.0
//! - one contained in the other scores 0.8
//! - otherwise Jaccard index over the character sets

use std::collections::BTreeSet;

/// Score for a title contained in the other
pub const SUBSTRING_SCORE: f64 = 0.8;

/// Lowercase, drop punctuation, collapse whitespace
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two titles in `0.0..=1.0`
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);

    if a == b {
        return 1.0;
    }
    // An empty title is contained in everything
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return SUBSTRING_SCORE;
    }

    let a_chars: BTreeSet<char> = a.chars().collect();
    let b_chars: BTreeSet<char> = b.chars().collect();
    let union = a_chars.union(&b_chars).count();
    if union == 0 {
        return 0.0;
    }
    a_chars.intersection(&b_chars).count() as f64 / union as f64
}
