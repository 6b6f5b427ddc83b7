//! Numeric-aware string ordering (`track2` < `track10`)

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Split into alternating digit / non-digit runs
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (index, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(previous) if previous != is_digit => {
                chunks.push(chunk(&s[start..index], previous));
                start = index;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(previous) = in_digits {
        chunks.push(chunk(&s[start..], previous));
    }
    chunks
}

fn chunk(text: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(text)
    } else {
        Chunk::Text(text)
    }
}

/// Compare digit runs as integers of any length
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

fn compare_chunks(a: &Chunk<'_>, b: &Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(a), Chunk::Digits(b)) => compare_digits(a, b),
        (Chunk::Text(a), Chunk::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
    }
}

/// Natural ordering: digit runs compare numerically, text runs lexically
/// (case-insensitive first)
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = chunks(a);
    let b_chunks = chunks(b);

    a_chunks
        .iter()
        .zip(b_chunks.iter())
        .map(|(a, b)| compare_chunks(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a_chunks.len().cmp(&b_chunks.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn test_numeric_runs_compare_as_integers() {
        assert_eq!(
            sorted(&["track10.flac", "track2.flac", "track1.flac"]),
            vec!["track1.flac", "track2.flac", "track10.flac"]
        );
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("008", "10"), Ordering::Less);
    }

    #[test]
    fn test_text_case_insensitive_first() {
        assert_eq!(sorted(&["b", "A", "a"]), vec!["A", "a", "b"]);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("disc1", "disc1track"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_large_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("take99999999999999999999999", "take100000000000000000000000"),
            Ordering::Less
        );
    }
}
