//! Candidate consolidation
//!
//! Folds a confidence-sorted candidate list into independent candidates.
//! Each candidate either merges into the first similar accepted candidate or
//! is accepted on its own. Merging is a pure reducer: inputs are never
//! modified, a new [`IdentificationResult`] is produced.
//!
//! Passes repeat until one makes no merge. A merged candidate can become
//! similar to one it did not match before (gap-filled artist or date), and
//! the extra passes make running consolidation on its own output a no-op.

use crate::types::{IdentificationResult, ShowInfo};
use tracing::debug;

/// Confidence added when two candidates agree
pub const DEFAULT_AGREEMENT_BONUS: u8 = 15;

/// Joins merged sources: `"filename + web_search"`
pub const SOURCE_SEPARATOR: &str = " + ";

/// Same city, or one venue containing the other (case-insensitive)
pub fn locations_match(a: &ShowInfo, b: &ShowInfo) -> bool {
    if let (Some(a_city), Some(b_city)) = (a.city(), b.city()) {
        if a_city.to_lowercase() == b_city.to_lowercase() {
            return true;
        }
    }

    if let (Some(a_venue), Some(b_venue)) = (a.venue(), b.venue()) {
        let a_venue = a_venue.to_lowercase();
        let b_venue = b_venue.to_lowercase();
        return a_venue.contains(&b_venue) || b_venue.contains(&a_venue);
    }

    false
}

fn date_only(info: &ShowInfo) -> bool {
    info.date().is_some() && info.artist().is_none()
}

fn artist_only(info: &ShowInfo) -> bool {
    info.artist().is_some() && info.date().is_none()
}

/// Whether two candidates describe the same show
///
/// - **Confirmatory**: equal dates and case-insensitively equal artists
/// - **Complementary**: matching locations, one side knows only the date and
///   the other only the artist
pub fn is_similar(a: &IdentificationResult, b: &IdentificationResult) -> bool {
    let (a, b) = (&a.show_info, &b.show_info);

    if let (Some(a_date), Some(a_artist), Some(b_date), Some(b_artist)) =
        (a.date(), a.artist(), b.date(), b.artist())
    {
        return a_date == b_date && a_artist.to_lowercase() == b_artist.to_lowercase();
    }

    locations_match(a, b) && ((date_only(a) && artist_only(b)) || (artist_only(a) && date_only(b)))
}

/// Merge `b` into `a`
///
/// Fields: `a` wins, `b` fills gaps. Confidence: rounded mean plus `bonus`,
/// capped at 100.
pub fn merge(a: &IdentificationResult, b: &IdentificationResult, bonus: u8) -> IdentificationResult {
    let mean = ((a.confidence as f64 + b.confidence as f64) / 2.0).round() as u32;

    let mut evidence = Vec::with_capacity(a.evidence.len() + b.evidence.len() + 1);
    evidence.extend(a.evidence.iter().cloned());
    evidence.push(format!("--- From {} ---", b.source));
    evidence.extend(b.evidence.iter().cloned());

    let mut merged = IdentificationResult::new(
        format!("{}{}{}", a.source, SOURCE_SEPARATOR, b.source),
        a.show_info.fill_gaps(&b.show_info),
        mean + bonus as u32,
    )
    .with_evidence(evidence);
    merged.reasoning = a.reasoning.clone().or_else(|| b.reasoning.clone());
    merged
}

/// Stable sort, highest confidence first
pub fn sort_by_confidence(results: &mut [IdentificationResult]) {
    results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
}

/// One walk over the sorted list; returns the accepted list and whether
/// anything merged
fn consolidate_pass(results: Vec<IdentificationResult>, bonus: u8) -> (Vec<IdentificationResult>, bool) {
    results.into_iter().fold((Vec::new(), false), |(mut accepted, merged_any), candidate| {
        match accepted.iter().position(|existing| is_similar(existing, &candidate)) {
            Some(index) => {
                debug!(
                    into = %accepted[index].source,
                    from = %candidate.source,
                    "Merging similar candidates"
                );
                accepted[index] = merge(&accepted[index], &candidate, bonus);
                (accepted, true)
            }
            None => {
                accepted.push(candidate);
                (accepted, merged_any)
            }
        }
    })
}

/// Sort, merge similar candidates, re-sort
pub fn consolidate(mut results: Vec<IdentificationResult>, bonus: u8) -> Vec<IdentificationResult> {
    sort_by_confidence(&mut results);

    loop {
        let (mut next, merged_any) = consolidate_pass(results, bonus);
        sort_by_confidence(&mut next);
        results = next;
        if !merged_any {
            return results;
        }
    }
}
