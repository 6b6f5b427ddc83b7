//! Core Types and Trait Definitions for showid-ingest
//!
//! Defines the data carried between the two engines:
//! - **Identification:** [`ShowInfo`], [`IdentificationResult`],
//!   [`IdentificationContext`] and the [`EvidenceStrategy`] trait
//! - **Matching:** [`SetlistSong`], [`AudioFileRecord`], [`MatchedTrack`]
//!
//! Everything here is created fresh per ingestion run and dropped afterwards.

use crate::error::StrategyError;
use crate::services::{LlmService, WebSearchService};
use serde::{Deserialize, Serialize};
use showid_common::config::IdentifyConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Highest confidence any result may carry
pub const MAX_CONFIDENCE: u8 = 100;

// ============================================================================
// Identification Types
// ============================================================================

/// Partial description of a show
///
/// Always partial during identification; dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Field value, treating blank strings as absent
fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn first_present(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    present(primary).or_else(|| present(fallback)).map(str::to_string)
}

impl ShowInfo {
    pub fn artist(&self) -> Option<&str> {
        present(&self.artist)
    }

    pub fn date(&self) -> Option<&str> {
        present(&self.date)
    }

    pub fn venue(&self) -> Option<&str> {
        present(&self.venue)
    }

    pub fn city(&self) -> Option<&str> {
        present(&self.city)
    }

    pub fn state(&self) -> Option<&str> {
        present(&self.state)
    }

    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.artist().is_none()
            && self.date().is_none()
            && self.venue().is_none()
            && self.city().is_none()
            && self.state().is_none()
            && self.country().is_none()
    }

    /// Field-wise union; `self` wins wherever it has a value
    pub fn fill_gaps(&self, other: &ShowInfo) -> ShowInfo {
        ShowInfo {
            artist: first_present(&self.artist, &other.artist),
            date: first_present(&self.date, &other.date),
            venue: first_present(&self.venue, &other.venue),
            city: first_present(&self.city, &other.city),
            state: first_present(&self.state, &other.state),
            country: first_present(&self.country, &other.country),
        }
    }
}

/// One weighted guess about show identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationResult {
    /// Identified fields
    pub show_info: ShowInfo,
    /// Heuristic score 0-100 (not a probability)
    pub confidence: u8,
    /// Strategy name, or `"a + b"` after consolidation
    pub source: String,
    /// Human-readable evidence lines
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl IdentificationResult {
    /// Create a result, clamping confidence to 0-100
    pub fn new(source: impl Into<String>, show_info: ShowInfo, confidence: u32) -> Self {
        Self {
            show_info,
            confidence: confidence.min(MAX_CONFIDENCE as u32) as u8,
            source: source.into(),
            evidence: Vec::new(),
            reasoning: None,
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Capabilities a strategy needs from the context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyCapabilities {
    pub requires_extraction: bool,
    pub requires_llm: bool,
    pub requires_web_search: bool,
}

impl StrategyCapabilities {
    /// No requirements
    pub const NONE: Self = Self {
        requires_extraction: false,
        requires_llm: false,
        requires_web_search: false,
    };

    pub const fn extraction() -> Self {
        Self {
            requires_extraction: true,
            requires_llm: false,
            requires_web_search: false,
        }
    }

    pub const fn extraction_and_llm() -> Self {
        Self {
            requires_extraction: true,
            requires_llm: true,
            requires_web_search: false,
        }
    }

    pub const fn web_search() -> Self {
        Self {
            requires_extraction: false,
            requires_llm: false,
            requires_web_search: true,
        }
    }
}

/// Shared input for one identification run
///
/// Built once by the orchestrator and handed read-only to every strategy.
#[derive(Clone)]
pub struct IdentificationContext {
    /// Archive (or directory) being identified
    pub archive_path: PathBuf,
    /// Final path component of `archive_path`
    pub filename: String,
    /// Directory the archive was extracted to, if extraction ran and succeeded
    pub extracted_dir: Option<PathBuf>,
    /// Text file contents keyed by path relative to `extracted_dir`
    pub text_files: BTreeMap<String, String>,
    /// Per-file audio metadata from the extracted tree
    pub audio_files: Vec<AudioFileRecord>,
    /// Identification tuning
    pub config: IdentifyConfig,
    /// Language-model collaborator, if configured
    pub llm: Option<Arc<dyn LlmService>>,
    /// Web-search collaborator, if configured
    pub web_search: Option<Arc<dyn WebSearchService>>,
}

impl IdentificationContext {
    /// Context with no extraction and no capability handles
    pub fn new(archive_path: impl Into<PathBuf>, config: IdentifyConfig) -> Self {
        let archive_path = archive_path.into();
        let filename = archive_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            archive_path,
            filename,
            extracted_dir: None,
            text_files: BTreeMap::new(),
            audio_files: Vec::new(),
            config,
            llm: None,
            web_search: None,
        }
    }

    /// True when every capability the strategy declares is present
    pub fn satisfies(&self, capabilities: &StrategyCapabilities) -> bool {
        (!capabilities.requires_extraction || self.extracted_dir.is_some())
            && (!capabilities.requires_llm || self.llm.is_some())
            && (!capabilities.requires_web_search || self.web_search.is_some())
    }
}

impl std::fmt::Debug for IdentificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentificationContext")
            .field("archive_path", &self.archive_path)
            .field("filename", &self.filename)
            .field("extracted_dir", &self.extracted_dir)
            .field("text_files", &self.text_files.len())
            .field("audio_files", &self.audio_files.len())
            .field("llm", &self.llm.is_some())
            .field("web_search", &self.web_search.is_some())
            .finish()
    }
}

/// Evidence strategy trait
///
/// Each strategy inspects the shared context and produces at most one
/// weighted guess.
///
/// # Example
/// ```rust,ignore
/// use showid_ingest::types::{EvidenceStrategy, IdentificationContext, IdentificationResult};
///
/// pub struct FolderNameStrategy;
///
/// #[async_trait::async_trait]
/// impl EvidenceStrategy for FolderNameStrategy {
///     fn name(&self) -> &'static str { "folder-name" }
///     fn capabilities(&self) -> StrategyCapabilities { StrategyCapabilities::NONE }
///
///     async fn identify(&self, ctx: &IdentificationContext)
///         -> Result<Option<IdentificationResult>, StrategyError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait EvidenceStrategy: Send + Sync {
    /// Strategy name, used as the result source and in logs
    fn name(&self) -> &'static str;

    /// Capabilities that must be present for this strategy to run
    fn capabilities(&self) -> StrategyCapabilities;

    /// Inspect the context
    ///
    /// # Returns
    /// * `Ok(Some(result))` - evidence found
    /// * `Ok(None)` - ran, found nothing usable
    ///
    /// # Errors
    /// Infrastructure failure (network, LLM, I/O); logged and excluded by the
    /// orchestrator
    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError>;
}

// ============================================================================
// Matching Types
// ============================================================================

/// Encore set number
pub const ENCORE_SET: u8 = 3;

/// One song of an authoritative setlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetlistSong {
    pub title: String,
    /// 1, 2, or 3 (encore)
    pub set: u8,
    /// 1-indexed position within the set
    pub position: u32,
}

impl SetlistSong {
    pub fn new(title: impl Into<String>, set: u8, position: u32) -> Self {
        Self {
            title: title.into(),
            set,
            position,
        }
    }
}

/// Audio file with whatever tag data could be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFileRecord {
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
}

impl AudioFileRecord {
    /// Record with no tag data
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            tag_title: None,
            track_number: None,
            disc_number: None,
        }
    }

    pub fn with_tag_title(mut self, title: impl Into<String>) -> Self {
        self.tag_title = Some(title.into());
        self
    }

    pub fn with_track(mut self, track_number: u32, disc_number: Option<u32>) -> Self {
        self.track_number = Some(track_number);
        self.disc_number = disc_number;
        self
    }

    /// Final path component
    pub fn file_name(&self) -> String {
        file_name_of(&self.file_path)
    }

    /// Tag title, if present and non-blank
    pub fn title(&self) -> Option<&str> {
        present(&self.tag_title)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// A file assigned to a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTrack {
    pub audio_file: AudioFileRecord,
    pub song: SetlistSong,
    /// Set number after the optional encore merge
    pub effective_set: u8,
    /// 1-indexed position within `effective_set`
    pub track_in_set: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped_to_100() {
        let result = IdentificationResult::new("test", ShowInfo::default(), 140);
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let info = ShowInfo {
            artist: Some("  ".to_string()),
            date: Some("1997-11-22".to_string()),
            ..Default::default()
        };
        assert_eq!(info.artist(), None);
        assert_eq!(info.date(), Some("1997-11-22"));
        assert!(!info.is_empty());
        assert!(ShowInfo::default().is_empty());
    }

    #[test]
    fn test_fill_gaps_prefers_self() {
        let a = ShowInfo {
            artist: Some("Phish".to_string()),
            city: Some("".to_string()),
            ..Default::default()
        };
        let b = ShowInfo {
            artist: Some("Trey".to_string()),
            city: Some("Hampton".to_string()),
            date: Some("1997-11-22".to_string()),
            ..Default::default()
        };

        let merged = a.fill_gaps(&b);
        assert_eq!(merged.artist.as_deref(), Some("Phish"));
        assert_eq!(merged.city.as_deref(), Some("Hampton"));
        assert_eq!(merged.date.as_deref(), Some("1997-11-22"));
        assert_eq!(merged.venue, None);
    }

    #[test]
    fn test_context_capability_check() {
        let mut ctx = IdentificationContext::new("/tmp/show.zip", IdentifyConfig::default());
        assert_eq!(ctx.filename, "show.zip");
        assert!(ctx.satisfies(&StrategyCapabilities::NONE));
        assert!(!ctx.satisfies(&StrategyCapabilities::extraction()));
        assert!(!ctx.satisfies(&StrategyCapabilities::web_search()));

        ctx.extracted_dir = Some(PathBuf::from("/tmp/show"));
        assert!(ctx.satisfies(&StrategyCapabilities::extraction()));
        assert!(!ctx.satisfies(&StrategyCapabilities::extraction_and_llm()));
    }

    #[test]
    fn test_audio_record_file_name() {
        let record = AudioFileRecord::new("/music/show/01 - Wilson.flac").with_tag_title(" ");
        assert_eq!(record.file_name(), "01 - Wilson.flac");
        assert_eq!(record.title(), None);
    }
}
