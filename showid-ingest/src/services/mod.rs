//! External collaborators
//!
//! The engines consume four narrow interfaces. Providers for the language
//! model and web search live outside this crate; local implementations are
//! supplied for extraction (already-extracted directories) and scanning
//! (filesystem walk + tag reading).
//!
//! # Interfaces
//! 1. **ArchiveExtractor** - archive path → extracted directory
//! 2. **MediaScanner** - text files and per-file audio metadata
//! 3. **LlmService** - structure analysis and show-info extraction
//! 4. **WebSearchService** - concert search results

pub mod archive;
pub mod media_scanner;

pub use archive::DirectoryExtractor;
pub use media_scanner::LocalMediaScanner;

use crate::error::ServiceError;
use crate::types::{AudioFileRecord, ShowInfo};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Turns an archive into a directory tree
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `path`, returning the directory holding its contents
    async fn extract(&self, path: &Path) -> Result<PathBuf, ServiceError>;
}

/// Reads the contents of an extracted tree
#[async_trait]
pub trait MediaScanner: Send + Sync {
    /// Text files keyed by path relative to `dir`
    async fn read_text_files(&self, dir: &Path) -> Result<BTreeMap<String, String>, ServiceError>;

    /// Audio file paths under `dir`, in a stable order
    async fn list_audio_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ServiceError>;

    /// Tag data for each path, in input order
    async fn analyze_audio(&self, paths: &[PathBuf]) -> Result<Vec<AudioFileRecord>, ServiceError>;
}

// ============================================================================
// Language Model
// ============================================================================

/// Archive layout handed to the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureRequest {
    pub archive_name: String,
    /// Relative paths of every entry in the extracted tree
    pub entries: Vec<String>,
}

/// Model's reading of the archive layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureSuggestion {
    /// Directory that holds the show, if the archive nests it
    pub show_directory: Option<String>,
    /// Files likely to describe the show (info files, checksums, logs)
    pub manifest_files: Vec<String>,
    pub notes: Option<String>,
}

/// Everything the model sees when asked to name the show
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowInfoExtractionRequest {
    pub archive_name: String,
    pub audio_file_names: Vec<String>,
    /// Manifest file contents keyed by relative path
    pub manifests: BTreeMap<String, String>,
    pub structure_notes: Option<String>,
}

/// Model's answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowInfoExtractionResult {
    pub show_info: ShowInfo,
    /// 0.0-1.0
    pub confidence: f64,
    pub reasoning: Option<String>,
}

/// Language-model collaborator
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn analyze_archive_structure(
        &self,
        request: &StructureRequest,
    ) -> Result<StructureSuggestion, ServiceError>;

    async fn extract_show_info(
        &self,
        request: &ShowInfoExtractionRequest,
    ) -> Result<ShowInfoExtractionResult, ServiceError>;
}

// ============================================================================
// Web Search
// ============================================================================

/// Concert search query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub artist: String,
    pub location: Option<String>,
    pub year_hint: Option<String>,
    /// Extra search terms (e.g. "setlist")
    pub terms: Vec<String>,
}

/// One search hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub description: String,
}

/// Search hits in provider order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Web-search collaborator
#[async_trait]
pub trait WebSearchService: Send + Sync {
    async fn search_concert(&self, query: &SearchQuery) -> Result<SearchResponse, ServiceError>;
}
