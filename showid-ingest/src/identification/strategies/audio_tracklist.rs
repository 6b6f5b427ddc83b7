//! Audio tracklist strategy
//!
//! Some sources embed the show in every track name or title tag:
//! `Tweezer (Live at Hampton Coliseum, Hampton, VA 11/22/1997)`. Each file is
//! scanned and the most frequent value per field wins (ties → first seen).

use crate::error::StrategyError;
use crate::parsing::dates::find_month_first_date;
use crate::parsing::location::lookup_city;
use crate::types::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, ShowInfo, StrategyCapabilities,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const BASE_CONFIDENCE: u32 = 60;
const MAX_CONFIDENCE: u32 = 90;
const MANY_FILES: usize = 10;

static LIVE_AT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)live\s+at\s+(?P<venue>[^,()]+?),\s*(?P<city>[^,()]+?),\s*(?P<state>[A-Z]{2})\s+(?P<date>\d{1,2}[/.-]\d{1,2}[/.-]\d{4})",
    )
    .expect("valid regex")
});

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\((?P<city>[^,()]+?),\s*(?P<state>[A-Z]{2})\s+(?P<date>\d{1,2}[/.-]\d{1,2}[/.-]\d{4})\)",
    )
    .expect("valid regex")
});

/// Occurrence counts in first-seen order
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match self.counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((value.to_string(), 1)),
        }
    }

    /// Most frequent value; earliest wins a tie
    fn winner(&self) -> Option<String> {
        self.counts
            .iter()
            .fold(None::<&(String, usize)>, |best, entry| match best {
                Some(best) if best.1 >= entry.1 => Some(best),
                _ => Some(entry),
            })
            .map(|(value, _)| value.clone())
    }
}

#[derive(Debug, Default)]
struct Tallies {
    venue: Tally,
    city: Tally,
    state: Tally,
    date: Tally,
}

impl Tallies {
    fn scan(&mut self, text: &str) {
        if let Some(caps) = LIVE_AT.captures(text) {
            self.record(&caps, caps.name("venue").map(|m| m.as_str()));
        } else if let Some(caps) = PARENTHETICAL.captures(text) {
            self.record(&caps, None);
        } else if let Some(date) = find_month_first_date(text) {
            self.date.add(&date);
        }
    }

    fn record(&mut self, caps: &regex::Captures<'_>, venue: Option<&str>) {
        if let Some(venue) = venue {
            self.venue.add(venue);
        }
        if let Some(city) = caps.name("city") {
            self.city.add(city.as_str());
        }
        if let Some(state) = caps.name("state") {
            self.state.add(state.as_str());
        }
        if let Some(date) = caps.name("date").and_then(|m| find_month_first_date(m.as_str())) {
            self.date.add(&date);
        }
    }
}

/// Venue, location and date embedded in track names and title tags
#[derive(Debug, Clone, Default)]
pub struct AudioTracklistStrategy;

impl AudioTracklistStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceStrategy for AudioTracklistStrategy {
    fn name(&self) -> &'static str {
        "audio_tracklist"
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::extraction()
    }

    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError> {
        if ctx.audio_files.is_empty() {
            debug!("No audio files to scan");
            return Ok(None);
        }

        let mut tallies = Tallies::default();
        for file in &ctx.audio_files {
            let file_name = file.file_name();
            let stem = file_name
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(&file_name);
            tallies.scan(stem);
            if let Some(title) = file.title() {
                tallies.scan(title);
            }
        }

        let city = tallies.city.winner();
        let show_info = ShowInfo {
            artist: None,
            date: tallies.date.winner(),
            venue: tallies.venue.winner(),
            country: city.as_deref().and_then(lookup_city).map(|known| known.country.to_string()),
            city,
            state: tallies.state.winner(),
        };

        if show_info.date().is_none() && show_info.venue().is_none() {
            debug!(files = ctx.audio_files.len(), "No show details in track names");
            return Ok(None);
        }

        let file_count = ctx.audio_files.len();
        let mut confidence = BASE_CONFIDENCE;
        let mut evidence = vec![format!("Scanned {} audio file names and titles", file_count)];

        if let Some(date) = show_info.date() {
            confidence += 20;
            evidence.push(format!("Date {} in track names", date));
        }
        if let Some(venue) = show_info.venue() {
            confidence += 10;
            evidence.push(format!("Venue '{}' in track names", venue));
        }
        if let (Some(city), Some(state)) = (show_info.city(), show_info.state()) {
            confidence += 10;
            evidence.push(format!("Location {}, {}", city, state));
        }
        if file_count >= MANY_FILES {
            confidence += 5;
            evidence.push(format!("{} files agree", file_count));
        }

        Ok(Some(
            IdentificationResult::new(self.name(), show_info, confidence.min(MAX_CONFIDENCE))
                .with_evidence(evidence),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioFileRecord;
    use showid_common::config::IdentifyConfig;

    fn context(files: Vec<AudioFileRecord>) -> IdentificationContext {
        let mut ctx = IdentificationContext::new("/archives/show.zip", IdentifyConfig::default());
        ctx.extracted_dir = Some("/tmp/show".into());
        ctx.audio_files = files;
        ctx
    }

    #[tokio::test]
    async fn test_live_at_in_file_names() {
        let files = (1..=10)
            .map(|n| {
                AudioFileRecord::new(format!(
                    "/tmp/show/{:02} Song (Live at Hampton Coliseum, Hampton, VA 11-22-1997).flac",
                    n
                ))
            })
            .collect();

        let result = AudioTracklistStrategy.identify(&context(files)).await.unwrap().unwrap();
        assert_eq!(result.show_info.venue(), Some("Hampton Coliseum"));
        assert_eq!(result.show_info.city(), Some("Hampton"));
        assert_eq!(result.show_info.state(), Some("VA"));
        assert_eq!(result.show_info.date(), Some("1997-11-22"));
        assert_eq!(result.show_info.country(), Some("USA"));
        // 60 + 20 + 10 + 10 + 5 = 105 → 90
        assert_eq!(result.confidence, 90);
    }

    #[tokio::test]
    async fn test_parenthetical_in_title_tags() {
        let files = vec![
            AudioFileRecord::new("/tmp/show/01.flac").with_tag_title("Wilson (Hampton, VA 11/22/1997)"),
            AudioFileRecord::new("/tmp/show/02.flac").with_tag_title("Reba (Hampton, VA 11/22/1997)"),
        ];

        let result = AudioTracklistStrategy.identify(&context(files)).await.unwrap().unwrap();
        assert!(result.show_info.venue().is_none());
        // 60 + 20 + 10
        assert_eq!(result.confidence, 90);
    }

    #[tokio::test]
    async fn test_bare_date_majority_vote() {
        let files = vec![
            AudioFileRecord::new("/tmp/show/a 11.21.1997.flac"),
            AudioFileRecord::new("/tmp/show/b 11.22.1997.flac"),
            AudioFileRecord::new("/tmp/show/c 11.22.1997.flac"),
        ];

        let result = AudioTracklistStrategy.identify(&context(files)).await.unwrap().unwrap();
        assert_eq!(result.show_info.date(), Some("1997-11-22"));
        assert_eq!(result.confidence, 80);
    }

    #[tokio::test]
    async fn test_plain_names_yield_none() {
        let files = vec![
            AudioFileRecord::new("/tmp/show/01 Wilson.flac"),
            AudioFileRecord::new("/tmp/show/02 Reba.flac"),
        ];
        assert!(AudioTracklistStrategy.identify(&context(files)).await.unwrap().is_none());
    }

    #[test]
    fn test_tally_tie_keeps_first_seen() {
        let mut tally = Tally::default();
        tally.add("b");
        tally.add("a");
        tally.add("a");
        tally.add("b");
        assert_eq!(tally.winner().as_deref(), Some("b"));
    }
}
