//! Archive filename → show metadata
//!
//! Recognised layouts, tried in order:
//! - `Artist - Live at Venue, City, ST MM-DD-YY`
//! - Taper shorthand `ph1997-11-22...` (abbreviation + date)
//! - Dash separated `Artist - 1997-11-22 - Venue, City, ST`
//! - Underscore separated `Artist_1997-11-22_Venue_City_ST`
//! - Space separated `Artist 1997-11-22 Venue`

use super::dates::{find_show_date, normalize_ymd, expand_year, DateQuality, FoundDate};
use super::location::{clean_venue, parse_location, ParsedLocation};
use crate::types::ShowInfo;
use once_cell::sync::Lazy;
use regex::Regex;

/// Taper abbreviations for frequently traded artists
pub const ARTIST_ABBREVIATIONS: &[(&str, &str)] = &[
    ("gd", "Grateful Dead"),
    ("ph", "Phish"),
    ("phish", "Phish"),
    ("wsp", "Widespread Panic"),
    ("dmb", "Dave Matthews Band"),
    ("abb", "Allman Brothers Band"),
    ("sci", "String Cheese Incident"),
    ("um", "Umphrey's McGee"),
    ("umph", "Umphrey's McGee"),
    ("moe", "moe."),
    ("tab", "Trey Anastasio Band"),
    ("jgb", "Jerry Garcia Band"),
    ("dso", "Dark Star Orchestra"),
    ("ymsb", "Yonder Mountain String Band"),
    ("lf", "Little Feat"),
    ("bt", "Blues Traveler"),
    ("mmw", "Medeski Martin & Wood"),
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz"];

static LIVE_AT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<prefix>.*?)\blive\s+at\s+(?P<venue>[^,]+),\s*(?P<city>[^,]+),\s*(?P<state>[A-Za-z]{2})\s+(?P<m>\d{1,2})[-./](?P<d>\d{1,2})[-./](?P<y>\d{2}|\d{4})\b",
    )
    .expect("valid regex")
});

static TAPER_SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?P<abbr>[a-z]{2,5})(?P<date>\d{2,4}-\d{2}-\d{2})(?P<rest>.*)$").expect("valid regex"));

/// Layout the filename was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowNameLayout {
    LiveAt,
    TaperShorthand,
    DashSeparated,
    UnderscoreSeparated,
    SpaceSeparated,
}

/// Show metadata read from an archive filename
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedShowName {
    pub show_info: ShowInfo,
    /// Precision of the date, if any form of date was found
    pub date_quality: Option<DateQuality>,
    /// Year of a year-only or vague date
    pub year: Option<i32>,
    pub layout: ShowNameLayout,
}

/// Filename without directory and archive extensions (`show.tar.gz` → `show`)
pub fn archive_stem(filename: &str) -> &str {
    let mut stem = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    while let Some((head, ext)) = stem.rsplit_once('.') {
        if head.is_empty() || !ARCHIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            break;
        }
        stem = head;
    }
    stem
}

/// Expand a taper abbreviation (`ph` → `Phish`)
pub fn expand_artist_abbreviation(abbreviation: &str) -> Option<&'static str> {
    let lower = abbreviation.to_ascii_lowercase();
    ARTIST_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == lower)
        .map(|(_, artist)| *artist)
}

fn clean_artist(text: &str) -> Option<String> {
    let trimmed = text
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.' | ':' | ','))
        .trim();
    let trimmed = trimmed
        .strip_suffix(" Live")
        .or_else(|| trimmed.strip_suffix(" live"))
        .unwrap_or(trimmed)
        .trim();

    if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit() || !c.is_alphanumeric()) {
        None
    } else {
        Some(trimmed.replace('_', " "))
    }
}

fn apply_location(info: &mut ShowInfo, location: ParsedLocation) {
    info.venue = info.venue.take().or(location.venue);
    info.city = info.city.take().or(location.city);
    info.state = info.state.take().or(location.state);
    info.country = info.country.take().or(location.country);
}

fn parse_live_at(stem: &str) -> Option<ParsedShowName> {
    let caps = LIVE_AT.captures(stem)?;

    let year_text = caps.name("y")?.as_str();
    let year: u32 = year_text.parse().ok()?;
    let year = if year_text.len() == 2 { expand_year(year) } else { year as i32 };
    let date = normalize_ymd(
        year,
        caps.name("m")?.as_str().parse().ok()?,
        caps.name("d")?.as_str().parse().ok()?,
    )?;

    let mut show_info = ShowInfo {
        artist: caps.name("prefix").and_then(|m| clean_artist(m.as_str())),
        date: Some(date),
        venue: caps.name("venue").and_then(|m| clean_venue(m.as_str())),
        city: caps.name("city").map(|m| m.as_str().trim().to_string()),
        state: caps.name("state").map(|m| m.as_str().to_ascii_uppercase()),
        country: None,
    };
    let location = parse_location(&format!(
        "{}, {}",
        show_info.city.as_deref().unwrap_or_default(),
        show_info.state.as_deref().unwrap_or_default()
    ));
    show_info.country = location.country;

    Some(ParsedShowName {
        show_info,
        date_quality: Some(if year_text.len() == 4 { DateQuality::Exact } else { DateQuality::Dashed }),
        year: None,
        layout: ShowNameLayout::LiveAt,
    })
}

fn parse_taper_shorthand(stem: &str) -> Option<ParsedShowName> {
    let caps = TAPER_SHORTHAND.captures(stem)?;
    let artist = expand_artist_abbreviation(caps.name("abbr")?.as_str())?;
    let found = find_show_date(caps.name("date")?.as_str())?;

    let mut show_info = ShowInfo {
        artist: Some(artist.to_string()),
        date: found.date.clone(),
        ..Default::default()
    };

    // Remainder is dotted or underscored: ".hampton.coliseum.sbd.flac16"
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
    let rest = rest.replace(['.', '_'], " ");
    apply_location(&mut show_info, parse_location(&rest));

    Some(ParsedShowName {
        show_info,
        date_quality: Some(found.quality),
        year: year_for(&found),
        layout: ShowNameLayout::TaperShorthand,
    })
}

fn year_for(found: &FoundDate) -> Option<i32> {
    found.date.is_none().then_some(found.year).flatten()
}

/// Split into segments, locate the date segment, read artist before and
/// location after it
fn parse_segments(segments: Vec<&str>, joiner: &str, layout: ShowNameLayout) -> ParsedShowName {
    let segments: Vec<&str> = segments
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    let dated = segments
        .iter()
        .enumerate()
        .find_map(|(index, segment)| find_show_date(segment).map(|found| (index, found)));

    let mut show_info = ShowInfo::default();
    let mut date_quality = None;
    let mut year = None;

    let location_text = match dated {
        Some((index, found)) => {
            let segment = segments[index];
            let before_date = &segment[..found.start];
            let after_date = &segment[found.end..];

            // Text sharing the date segment belongs to the artist only when
            // no segment precedes it. Dashed names put the artist in the
            // first segment alone (`Artist - Venue - Date`).
            let mut location_parts = Vec::new();
            if index == 0 {
                show_info.artist = clean_artist(before_date);
            } else if layout == ShowNameLayout::DashSeparated {
                show_info.artist = clean_artist(segments[0]);
                location_parts.extend_from_slice(&segments[1..index]);
                location_parts.push(before_date);
            } else {
                show_info.artist = clean_artist(&segments[..index].join(joiner));
                location_parts.push(before_date);
            }

            show_info.date = found.date.clone();
            date_quality = Some(found.quality);
            year = year_for(&found);

            location_parts.push(after_date);
            location_parts.extend_from_slice(&segments[index + 1..]);
            location_parts
                .into_iter()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(joiner)
        }
        None => {
            show_info.artist = segments.first().and_then(|first| clean_artist(first));
            segments.get(1..).map(|rest| rest.join(joiner)).unwrap_or_default()
        }
    };

    apply_location(&mut show_info, parse_location(&location_text));

    ParsedShowName { show_info, date_quality, year, layout }
}

/// Read show metadata from an archive filename
pub fn parse_show_name(filename: &str) -> ParsedShowName {
    let stem = archive_stem(filename);

    if let Some(parsed) = parse_live_at(stem) {
        return parsed;
    }
    if let Some(parsed) = parse_taper_shorthand(stem) {
        return parsed;
    }

    if stem.contains(" - ") {
        parse_segments(stem.split(" - ").collect(), ", ", ShowNameLayout::DashSeparated)
    } else if stem.contains('_') {
        parse_segments(stem.split('_').collect(), " ", ShowNameLayout::UnderscoreSeparated)
    } else {
        parse_segments(vec![stem], " ", ShowNameLayout::SpaceSeparated)
    }
}
