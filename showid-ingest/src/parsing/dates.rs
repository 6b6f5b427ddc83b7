//! Date recognition for filenames, tracklists and search snippets
//!
//! All recognised dates are normalised to `YYYY-MM-DD` and validated with
//! `chrono`, so "1997-02-30" is never produced.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// How precisely a date was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateQuality {
    /// Year first, four-digit year: `1997-11-22`, `1997.11.22`, `19971122`
    Exact,
    /// Month/day first or two-digit year: `11-22-97`, `11/22/1997`, `97-11-22`
    Dashed,
    /// Year without month or day
    YearOnly,
    /// Season, decade or abbreviated year (`Fall '97`, `1990s`)
    Vague,
}

impl DateQuality {
    /// Confidence contribution of a date of this quality
    pub fn bonus(self) -> u32 {
        match self {
            DateQuality::Exact => 20,
            DateQuality::Dashed => 15,
            DateQuality::YearOnly => 10,
            DateQuality::Vague => 5,
        }
    }
}

/// A date found in free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundDate {
    /// `YYYY-MM-DD`, absent for year-only and vague matches
    pub date: Option<String>,
    pub year: Option<i32>,
    pub quality: DateQuality,
    /// Byte range of the match in the searched text
    pub start: usize,
    pub end: usize,
}

static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(?P<y>(?:19|20)\d{2})[-._/](?P<m>\d{1,2})[-._/](?P<d>\d{1,2})(?:\D|$)")
        .expect("valid regex")
});

static COMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(?P<y>(?:19|20)\d{2})(?P<m>\d{2})(?P<d>\d{2})(?:\D|$)").expect("valid regex")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(?P<a>\d{1,2})[-./](?P<b>\d{1,2})[-./](?P<c>\d{4}|\d{2})(?:\D|$)")
        .expect("valid regex")
});

static YEAR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(?P<y>(?:19|20)\d{2})(?:[^\ds]|$)").expect("valid regex"));

static VAGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:spring|summer|fall|autumn|winter|early|mid|late)\s+'?(?P<sy>\d{2}|\d{4})\b|(?P<decade>(?:19|20)\d0)'?s\b|'(?P<ay>\d{2})\b)",
    )
    .expect("valid regex")
});

static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(?P<m>\d{1,2})[/.-](?P<d>\d{1,2})[/.-](?P<y>\d{4})(?:\D|$)").expect("valid regex")
});

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})\b").expect("valid regex"));

const MONTH_PATTERN: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<mon>{})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<y>\d{{4}})\b",
        MONTH_PATTERN
    ))
    .expect("valid regex")
});

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\s+(?P<mon>{})\.?,?\s+(?P<y>\d{{4}})\b",
        MONTH_PATTERN
    ))
    .expect("valid regex")
});

/// Format a calendar date, rejecting impossible ones
pub fn normalize_ymd(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Expand a two-digit year: `00-49` → 2000s, `50-99` → 1900s
pub fn expand_year(year: u32) -> i32 {
    match year {
        0..=49 => 2000 + year as i32,
        50..=99 => 1900 + year as i32,
        _ => year as i32,
    }
}

/// Month number for an English month name or abbreviation
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn num(caps: &regex::Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

/// Byte range of the named date group span, excluding boundary characters
fn span(caps: &regex::Captures<'_>, first: &str, last: &str) -> (usize, usize) {
    let start = caps.name(first).map(|m| m.start()).unwrap_or(0);
    let end = caps.name(last).map(|m| m.end()).unwrap_or(start);
    (start, end)
}

fn exact_date(text: &str) -> Option<FoundDate> {
    for regex in [&*YEAR_FIRST, &*COMPACT] {
        for caps in regex.captures_iter(text) {
            let (Some(year), Some(month), Some(day)) = (num(&caps, "y"), num(&caps, "m"), num(&caps, "d")) else {
                continue;
            };
            if let Some(date) = normalize_ymd(year as i32, month, day) {
                let (start, end) = span(&caps, "y", "d");
                return Some(FoundDate {
                    date: Some(date),
                    year: Some(year as i32),
                    quality: DateQuality::Exact,
                    start,
                    end,
                });
            }
        }
    }
    None
}

/// `M-D-YY`, `M/D/YYYY`, and the taper-style `YY-MM-DD`
fn dashed_date(text: &str) -> Option<FoundDate> {
    for caps in NUMERIC.captures_iter(text) {
        let (Some(a), Some(b)) = (num(&caps, "a"), num(&caps, "b")) else {
            continue;
        };
        let Some(c_match) = caps.name("c") else {
            continue;
        };
        let Ok(c) = c_match.as_str().parse::<u32>() else {
            continue;
        };
        let four_digit_year = c_match.as_str().len() == 4;

        // Month-first reading, then year-first for two-digit triples
        let mut date = normalize_ymd(
            if four_digit_year { c as i32 } else { expand_year(c) },
            a,
            b,
        );
        if date.is_none() && !four_digit_year {
            date = normalize_ymd(expand_year(a), b, c);
        }

        if let Some(date) = date {
            let year = date.get(..4).and_then(|y| y.parse().ok());
            let (start, end) = span(&caps, "a", "c");
            return Some(FoundDate {
                date: Some(date),
                year,
                quality: DateQuality::Dashed,
                start,
                end,
            });
        }
    }
    None
}

fn year_only(text: &str) -> Option<FoundDate> {
    let caps = YEAR_ONLY.captures(text)?;
    let year_match = caps.name("y")?;
    Some(FoundDate {
        date: None,
        year: year_match.as_str().parse().ok(),
        quality: DateQuality::YearOnly,
        start: year_match.start(),
        end: year_match.end(),
    })
}

fn vague_date(text: &str) -> Option<FoundDate> {
    let caps = VAGUE.captures(text)?;
    let whole = caps.get(0)?;
    let year = if let Some(season_year) = caps.name("sy") {
        let value: u32 = season_year.as_str().parse().ok()?;
        Some(if season_year.as_str().len() == 2 { expand_year(value) } else { value as i32 })
    } else if let Some(decade) = caps.name("decade") {
        decade.as_str().parse().ok()
    } else {
        caps.name("ay")
            .and_then(|y| y.as_str().parse().ok())
            .map(expand_year)
    };
    Some(FoundDate {
        date: None,
        year,
        quality: DateQuality::Vague,
        start: whole.start(),
        end: whole.end(),
    })
}

/// Best date in a show name, most precise form first
pub fn find_show_date(text: &str) -> Option<FoundDate> {
    exact_date(text)
        .or_else(|| dashed_date(text))
        .or_else(|| year_only(text))
        .or_else(|| vague_date(text))
}

/// Bare `M/D/YYYY` (also `-` or `.` separated)
pub fn find_month_first_date(text: &str) -> Option<String> {
    SLASH_DATE.captures_iter(text).find_map(|caps| {
        normalize_ymd(num(&caps, "y")? as i32, num(&caps, "m")?, num(&caps, "d")?)
    })
}

/// Calendar dates in prose, in order of appearance
///
/// Recognises `YYYY-MM-DD`, `Month D, YYYY` and `D Month, YYYY`.
pub fn find_calendar_dates(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in ISO_DATE.captures_iter(text) {
        if let (Some(y), Some(m), Some(d)) = (num(&caps, "y"), num(&caps, "m"), num(&caps, "d")) {
            if let Some(date) = normalize_ymd(y as i32, m, d) {
                found.push((caps.get(0).map(|m| m.start()).unwrap_or(0), date));
            }
        }
    }

    for regex in [&*MONTH_DAY_YEAR, &*DAY_MONTH_YEAR] {
        for caps in regex.captures_iter(text) {
            let month = caps.name("mon").and_then(|m| month_number(m.as_str()));
            if let (Some(y), Some(m), Some(d)) = (num(&caps, "y"), month, num(&caps, "d")) {
                if let Some(date) = normalize_ymd(y as i32, m, d) {
                    found.push((caps.get(0).map(|m| m.start()).unwrap_or(0), date));
                }
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, date)| date).collect()
}
