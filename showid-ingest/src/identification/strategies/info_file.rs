//! Info file strategy
//!
//! Taper info files (`info.txt`, `*.nfo`) usually open with a header block:
//!
//! ```text
//! Phish
//! November 22, 1997
//! Hampton Coliseum
//! Hampton, VA
//! ```
//!
//! or with `Key: Value` lines (`Artist:`, `Date:`, `Venue:`, `Location:`).
//! Only the header is read; setlists and lineage further down are ignored.

use crate::error::StrategyError;
use crate::parsing::dates::{find_calendar_dates, find_show_date};
use crate::parsing::location::{find_venue, lookup_city, parse_location};
use crate::types::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, ShowInfo, StrategyCapabilities,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const BASE_CONFIDENCE: u32 = 55;
const MAX_CONFIDENCE: u32 = 90;

/// Non-empty lines read from the top of each file
const HEADER_LINES: usize = 20;

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<key>[A-Za-z ]{2,20}):\s*(?P<value>.+)$").expect("valid regex"));

static CITY_STATE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<city>[A-Za-z][A-Za-z .'-]*),\s*(?P<state>[A-Z]{2})\b").expect("valid regex")
});

/// Lines that start a track listing or technical notes
static TRACK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:d\d+t\d+|s\d[_t]\d+|\d{1,3}[.)\s-]|set\s*\d|disc\s*\d|encore)").expect("valid regex")
});

fn line_date(line: &str) -> Option<String> {
    find_calendar_dates(line)
        .into_iter()
        .next()
        .or_else(|| find_show_date(line).and_then(|found| found.date))
}

/// Show fields found in one file's header
#[derive(Debug, Default)]
struct HeaderScan {
    info: ShowInfo,
}

impl HeaderScan {
    fn field_count(&self) -> usize {
        [
            self.info.artist(),
            self.info.date(),
            self.info.venue(),
            self.info.city(),
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }

    fn set_city_state(&mut self, text: &str) {
        let location = parse_location(text);
        if self.info.city.is_none() {
            self.info.city = location.city;
        }
        if self.info.state.is_none() {
            self.info.state = location.state;
        }
        if self.info.country.is_none() {
            self.info.country = location.country;
        }
        if self.info.venue.is_none() {
            self.info.venue = location.venue;
        }
    }

    fn key_value(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "artist" | "band" | "performer" => {
                self.info.artist.get_or_insert_with(|| value.to_string());
            }
            "date" | "show date" => {
                if self.info.date.is_none() {
                    self.info.date = line_date(value);
                }
            }
            "venue" => {
                self.info.venue.get_or_insert_with(|| value.to_string());
            }
            "location" | "city" | "place" => self.set_city_state(value),
            _ => {}
        }
    }

    fn scan(text: &str) -> Self {
        let mut scan = Self::default();
        let mut previous: Option<&str> = None;

        for line in text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(HEADER_LINES)
        {
            if TRACK_LINE.is_match(line) {
                break;
            }

            if let Some(caps) = KEY_VALUE.captures(line) {
                let key = caps.name("key").map(|m| m.as_str()).unwrap_or_default();
                let value = caps.name("value").map(|m| m.as_str()).unwrap_or_default();
                // Unknown keys (Source:, Lineage:, Taper:) are technical notes
                scan.key_value(key, value);
                previous = None;
                continue;
            }

            if scan.info.date.is_none() {
                if let Some(date) = line_date(line) {
                    scan.info.date = Some(date);
                    previous = None;
                    continue;
                }
            }

            if let Some(caps) = CITY_STATE_LINE.captures(line) {
                let city = caps.name("city").map(|m| m.as_str().trim()).unwrap_or_default();
                if scan.info.city.is_none() && !city.is_empty() {
                    scan.info.city = Some(lookup_city(city).map_or(city, |known| known.name).to_string());
                    scan.info.state = caps.name("state").map(|m| m.as_str().to_string());
                    scan.info.country = Some(
                        lookup_city(city).map_or("USA", |known| known.country).to_string(),
                    );
                    // A bare line just above the location is the venue
                    if scan.info.venue.is_none() {
                        scan.info.venue = previous.map(str::to_string);
                    }
                }
                previous = None;
                continue;
            }

            if scan.info.venue.is_none() {
                if let Some(venue) = find_venue(line) {
                    if scan.info.artist.is_some() {
                        scan.info.venue = Some(venue);
                        previous = None;
                        continue;
                    }
                }
            }

            if scan.info.artist.is_none() {
                scan.info.artist = Some(line.to_string());
                previous = None;
                continue;
            }

            previous = Some(line);
        }

        scan
    }
}

/// Ordering for candidate files: names containing "info" first, then path
fn file_priority(path: &str) -> (bool, &str) {
    (!path.to_ascii_lowercase().contains("info"), path)
}

/// Show metadata from taper info files
#[derive(Debug, Clone, Default)]
pub struct InfoFileStrategy;

impl InfoFileStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceStrategy for InfoFileStrategy {
    fn name(&self) -> &'static str {
        "info_file"
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::extraction()
    }

    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError> {
        let mut files: Vec<(&String, &String)> = ctx.text_files.iter().collect();
        files.sort_by(|a, b| file_priority(a.0).cmp(&file_priority(b.0)));

        let best = files
            .into_iter()
            .map(|(path, text)| (path, HeaderScan::scan(text)))
            .filter(|(_, scan)| scan.info.date().is_some() || scan.info.artist().is_some())
            .fold(None::<(&String, HeaderScan)>, |best, candidate| match best {
                Some(best) if best.1.field_count() >= candidate.1.field_count() => Some(best),
                _ => Some(candidate),
            });

        let Some((path, scan)) = best else {
            debug!(files = ctx.text_files.len(), "No info file header found");
            return Ok(None);
        };
        let info = scan.info;

        let mut confidence = BASE_CONFIDENCE;
        let mut evidence = vec![format!("Header of {}", path)];

        if let Some(date) = info.date() {
            confidence += 20;
            evidence.push(format!("Date {}", date));
        }
        if let Some(artist) = info.artist() {
            confidence += 10;
            evidence.push(format!("Artist '{}'", artist));
        }
        if let Some(venue) = info.venue() {
            confidence += 10;
            evidence.push(format!("Venue '{}'", venue));
        }
        if let (Some(city), Some(state)) = (info.city(), info.state()) {
            confidence += 5;
            evidence.push(format!("Location {}, {}", city, state));
        }

        Ok(Some(
            IdentificationResult::new(self.name(), info, confidence.min(MAX_CONFIDENCE))
                .with_evidence(evidence),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showid_common::config::IdentifyConfig;

    fn context(files: &[(&str, &str)]) -> IdentificationContext {
        let mut ctx = IdentificationContext::new("/archives/show.zip", IdentifyConfig::default());
        ctx.extracted_dir = Some("/tmp/show".into());
        ctx.text_files = files
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        ctx
    }

    #[tokio::test]
    async fn test_positional_header() {
        let text = "Phish\nNovember 22, 1997\nHampton Coliseum\nHampton, VA\n\nSource: SBD > DAT\n\nSet 1\n01 Emotional Rescue\n";
        let result = InfoFileStrategy
            .identify(&context(&[("ph1997-11-22/info.txt", text)]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.show_info.artist(), Some("Phish"));
        assert_eq!(result.show_info.date(), Some("1997-11-22"));
        assert_eq!(result.show_info.venue(), Some("Hampton Coliseum"));
        assert_eq!(result.show_info.city(), Some("Hampton"));
        assert_eq!(result.show_info.state(), Some("VA"));
        // 55 + 20 + 10 + 10 + 5 = 100 → 90
        assert_eq!(result.confidence, 90);
    }

    #[tokio::test]
    async fn test_key_value_header() {
        let text = "Artist: Grateful Dead\nDate: 1977-05-08\nVenue: Barton Hall\nLocation: Ithaca, NY\nTaper: unknown\n";
        let result = InfoFileStrategy
            .identify(&context(&[("gd77-05-08.txt", text)]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.show_info.artist(), Some("Grateful Dead"));
        assert_eq!(result.show_info.date(), Some("1977-05-08"));
        assert_eq!(result.show_info.venue(), Some("Barton Hall"));
        assert_eq!(result.show_info.city(), Some("Ithaca"));
        assert_eq!(result.show_info.state(), Some("NY"));
    }

    #[tokio::test]
    async fn test_artist_only_scores_base_plus_ten() {
        let result = InfoFileStrategy
            .identify(&context(&[("notes.txt", "Phish\n")]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.confidence, 65);
    }

    #[tokio::test]
    async fn test_prefers_richest_file() {
        let result = InfoFileStrategy
            .identify(&context(&[
                ("a.txt", "Phish\n"),
                ("b.txt", "Phish\n1997-11-22\nHampton Coliseum\nHampton, VA\n"),
            ]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.show_info.date(), Some("1997-11-22"));
        assert!(result.evidence[0].contains("b.txt"));
    }

    #[tokio::test]
    async fn test_track_listing_only_is_none() {
        let result = InfoFileStrategy
            .identify(&context(&[("tracks.txt", "01 Wilson\n02 Reba\n")]))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_no_text_files_is_none() {
        assert!(InfoFileStrategy.identify(&context(&[])).await.unwrap().is_none());
    }
}
