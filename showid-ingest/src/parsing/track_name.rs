//! Track filename parsing
//!
//! Pulls set, track and title out of common taper naming schemes. Patterns
//! are tried in order; the first that matches wins.
//!
//! | Pattern            | Example                     |
//! |--------------------|-----------------------------|
//! | `d{set}t{track}`   | `ph1997-11-22d1t03 Reba`    |
//! | `s{set}t{track}`   | `s2_05 Tweezer`, `s1t02`    |
//! | `{set}-{track} …`  | `1-05 Wilson`               |
//! | `{track} - …`      | `03 - Reba`                 |
//! | `{track} …`        | `03 Reba`, `03.Reba`        |

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DISC_TRACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)d(?P<set>\d{1,2})t(?P<track>\d{1,3})").expect("valid regex"));

static SET_TRACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])s(?P<set>\d)[_t](?P<track>\d{1,3})").expect("valid regex")
});

static SET_DASH_TRACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<set>\d)-(?P<track>\d{1,3})\s+(?P<title>.+)$").expect("valid regex")
});

static TRACK_DASH_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<track>\d{1,3})\s*-\s*(?P<title>.+)$").expect("valid regex"));

static LEADING_TRACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<track>\d{1,3})(?:[\s._-]+(?P<title>.*))?$").expect("valid regex")
});

/// Set, track and title read from a filename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTrackName {
    pub set: Option<u32>,
    pub track: Option<u32>,
    /// Present only when a pattern matched and left a non-empty title
    pub title: Option<String>,
}

fn clean_title(raw: &str) -> Option<String> {
    let title = raw.replace('_', " ");
    let title = title
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '-'))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '>' | '-' | '*'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!title.is_empty()).then_some(title)
}

fn number(caps: &regex::Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Parse a track filename (extension is ignored)
pub fn parse_track_name(file_name: &str) -> ParsedTrackName {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let stem = stem.trim();

    for regex in [&*DISC_TRACK, &*SET_TRACK] {
        if let Some(caps) = regex.captures(stem) {
            let end = caps.get(0).map(|m| m.end()).unwrap_or(stem.len());
            return ParsedTrackName {
                set: number(&caps, "set"),
                track: number(&caps, "track"),
                title: clean_title(&stem[end..]),
            };
        }
    }

    if let Some(caps) = SET_DASH_TRACK.captures(stem) {
        return ParsedTrackName {
            set: number(&caps, "set"),
            track: number(&caps, "track"),
            title: caps.name("title").and_then(|m| clean_title(m.as_str())),
        };
    }

    for regex in [&*TRACK_DASH_TITLE, &*LEADING_TRACK] {
        if let Some(caps) = regex.captures(stem) {
            return ParsedTrackName {
                set: None,
                track: number(&caps, "track"),
                title: caps.name("title").and_then(|m| clean_title(m.as_str())),
            };
        }
    }

    ParsedTrackName::default()
}
