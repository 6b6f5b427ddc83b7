//! Web search strategy
//!
//! Builds a concert query from the filename (artist plus location and year
//! hints), then scans result titles and descriptions for the first calendar
//! date. Provider failures are returned as errors. A search without a date
//! still yields the artist at base confidence; only a found date earns the
//! date bonus.

use crate::error::StrategyError;
use crate::parsing::dates::find_calendar_dates;
use crate::parsing::show_name::parse_show_name;
use crate::services::{SearchQuery, SearchResponse};
use crate::types::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, ShowInfo, StrategyCapabilities,
};
use async_trait::async_trait;
use tracing::debug;

const BASE_CONFIDENCE: u32 = 50;
const MAX_CONFIDENCE: u32 = 85;
const MANY_RESULTS: usize = 5;

/// First date in result order, title before description
pub fn first_result_date(response: &SearchResponse) -> Option<String> {
    response.results.iter().find_map(|result| {
        find_calendar_dates(&result.title)
            .into_iter()
            .next()
            .or_else(|| find_calendar_dates(&result.description).into_iter().next())
    })
}

/// Concert date found through a web search
#[derive(Debug, Clone, Default)]
pub struct WebSearchStrategy;

impl WebSearchStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceStrategy for WebSearchStrategy {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::web_search()
    }

    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError> {
        let search = ctx
            .web_search
            .as_ref()
            .ok_or(StrategyError::MissingCapability("web_search"))?;

        let parsed = parse_show_name(&ctx.filename);
        let filename_info = &parsed.show_info;
        let Some(artist) = filename_info.artist() else {
            debug!(filename = %ctx.filename, "No artist to search for");
            return Ok(None);
        };

        let location_parts: Vec<&str> = [filename_info.venue(), filename_info.city(), filename_info.state()]
            .into_iter()
            .flatten()
            .collect();
        let location = (!location_parts.is_empty()).then(|| location_parts.join(" "));
        let year_hint = filename_info
            .date()
            .and_then(|date| date.get(..4))
            .map(str::to_string)
            .or_else(|| parsed.year.map(|year| year.to_string()));

        let query = SearchQuery {
            artist: artist.to_string(),
            location: location.clone(),
            year_hint: year_hint.clone(),
            terms: vec!["concert".to_string(), "setlist".to_string()],
        };
        let response = search.search_concert(&query).await?;

        let date = first_result_date(&response);
        let mut confidence = BASE_CONFIDENCE;
        let mut evidence = vec![format!("Searched '{}' ({} results)", artist, response.results.len())];
        match &date {
            Some(date) => {
                confidence += 20;
                evidence.push(format!("Date {} in search results", date));
            }
            None => debug!(artist, results = response.results.len(), "No date in search results"),
        }
        if let Some(location) = &location {
            confidence += 10;
            evidence.push(format!("Location hint '{}'", location));
        }
        if let Some(year) = &year_hint {
            confidence += 5;
            evidence.push(format!("Year hint {}", year));
        }
        if response.results.len() >= MANY_RESULTS {
            confidence += 5;
        }

        let show_info = ShowInfo {
            artist: Some(artist.to_string()),
            date,
            ..Default::default()
        }
        .fill_gaps(filename_info);

        Ok(Some(
            IdentificationResult::new(self.name(), show_info, confidence.min(MAX_CONFIDENCE))
                .with_evidence(evidence),
        ))
    }
}
