//! Filename strategy
//!
//! Reads the archive filename only; needs no extraction or services.

use crate::error::StrategyError;
use crate::parsing::show_name::{parse_show_name, ShowNameLayout};
use crate::types::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, StrategyCapabilities,
};
use async_trait::async_trait;
use tracing::debug;

const BASE_CONFIDENCE: u32 = 50;
const MAX_CONFIDENCE: u32 = 90;

/// Show metadata from structured archive filenames
#[derive(Debug, Clone, Default)]
pub struct FilenameStrategy;

impl FilenameStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn layout_label(layout: ShowNameLayout) -> &'static str {
    match layout {
        ShowNameLayout::LiveAt => "live-at",
        ShowNameLayout::TaperShorthand => "taper shorthand",
        ShowNameLayout::DashSeparated => "dash-separated",
        ShowNameLayout::UnderscoreSeparated => "underscore-separated",
        ShowNameLayout::SpaceSeparated => "space-separated",
    }
}

#[async_trait]
impl EvidenceStrategy for FilenameStrategy {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::NONE
    }

    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError> {
        let parsed = parse_show_name(&ctx.filename);
        let info = &parsed.show_info;

        if info.date().is_none() && info.artist().is_none() {
            debug!(filename = %ctx.filename, "Filename carries no artist or date");
            return Ok(None);
        }

        let mut confidence = BASE_CONFIDENCE;
        let mut evidence = vec![format!(
            "Filename '{}' read as {}",
            ctx.filename,
            layout_label(parsed.layout)
        )];

        if let Some(quality) = parsed.date_quality {
            confidence += quality.bonus();
            match (info.date(), parsed.year) {
                (Some(date), _) => evidence.push(format!("Date {} ({:?})", date, quality)),
                (None, Some(year)) => evidence.push(format!("Year {} ({:?})", year, quality)),
                (None, None) => {}
            }
        }

        if let Some(artist) = info.artist() {
            confidence += 10;
            evidence.push(format!("Artist '{}'", artist));
        }

        if let Some(venue) = info.venue() {
            confidence += 10;
            evidence.push(format!("Venue '{}'", venue));
        }

        match (info.city(), info.state()) {
            (Some(city), Some(state)) => {
                confidence += 10;
                evidence.push(format!("Location {}, {}", city, state));
            }
            (Some(place), None) | (None, Some(place)) => {
                confidence += 5;
                evidence.push(format!("Location {}", place));
            }
            (None, None) => {}
        }

        if info.artist().is_some()
            && info.date().is_some()
            && (info.venue().is_some() || info.city().is_some())
        {
            confidence += 10;
            evidence.push("Artist, date and location all present".to_string());
        }

        Ok(Some(
            IdentificationResult::new(self.name(), info.clone(), confidence.min(MAX_CONFIDENCE))
                .with_evidence(evidence),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showid_common::config::IdentifyConfig;

    async fn identify(filename: &str) -> Option<IdentificationResult> {
        let ctx = IdentificationContext::new(format!("/archives/{}", filename), IdentifyConfig::default());
        FilenameStrategy.identify(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_full_filename_capped_at_90() {
        // 50 + 20 + 10 + 10 + 10 + 10 = 110 → 90
        let result = identify("Phish - 1997-11-22 - Hampton Coliseum, Hampton, VA.zip")
            .await
            .unwrap();
        assert_eq!(result.confidence, 90);
        assert_eq!(result.source, "filename");
        assert_eq!(result.show_info.artist(), Some("Phish"));
        assert_eq!(result.show_info.date(), Some("1997-11-22"));
    }

    #[tokio::test]
    async fn test_artist_and_exact_date_only() {
        // 50 + 20 + 10
        let result = identify("Phish - 1997-11-22.zip").await.unwrap();
        assert_eq!(result.confidence, 80);
    }

    #[tokio::test]
    async fn test_year_only_scores_ten() {
        // 50 + 10 (year) + 10 (artist)
        let result = identify("Phish - 1997.zip").await.unwrap();
        assert_eq!(result.confidence, 70);
        assert!(result.show_info.date().is_none());
        assert!(result.evidence.iter().any(|line| line.contains("Year 1997")));
    }

    #[tokio::test]
    async fn test_date_without_artist() {
        // 50 + 20
        let result = identify("1997-11-22.zip").await.unwrap();
        assert_eq!(result.confidence, 70);
        assert!(result.show_info.artist().is_none());
    }

    #[tokio::test]
    async fn test_no_artist_no_date_is_none() {
        assert!(identify("12345.zip").await.is_none());
    }
}
