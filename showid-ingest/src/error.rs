//! Error types for showid-ingest
//!
//! Failures are split by who can act on them:
//! - [`ServiceError`]: an external collaborator (extractor, scanner, LLM,
//!   web search) failed
//! - [`StrategyError`]: an evidence strategy could not run to completion;
//!   the orchestrator logs it and drops the strategy from the run
//! - [`TrackCountMismatchError`]: the single unrecoverable matcher condition

use crate::types::{AudioFileRecord, SetlistSong};
use std::time::Duration;
use thiserror::Error;

/// Collaborator failure
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Path does not exist or cannot be used as input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input format is not handled by this collaborator
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Remote provider (LLM, search engine) failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Evidence strategy failure
///
/// "Found nothing" is not an error; strategies return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Collaborator call failed
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Strategy exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Strategy panicked while running
    #[error("Panicked: {0}")]
    Panicked(String),

    /// Strategy invoked without a capability it requires
    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Number of audio files differs from the number of setlist songs
///
/// Carries both inputs in full so the operator can decide whether files need
/// splitting or merging before retrying.
#[derive(Debug, Clone, Error)]
#[error(
    "Track count mismatch: {} audio files but {} setlist songs",
    .files.len(),
    .songs.len()
)]
pub struct TrackCountMismatchError {
    /// Audio files as supplied
    pub files: Vec<AudioFileRecord>,
    /// Setlist as supplied (before encore merge)
    pub songs: Vec<SetlistSong>,
}
