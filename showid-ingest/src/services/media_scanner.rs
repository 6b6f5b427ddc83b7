//! Filesystem media scanner
//!
//! Walks an extracted tree with `walkdir` and reads tags with `lofty`:
//! - Text files (`.txt`, `.nfo`, `.md`) up to a size cap
//! - Audio files by extension, sorted by path
//! - Title, track number and disc number per audio file
//!
//! Files whose tags cannot be read are still returned, with no tag data.

use super::MediaScanner;
use crate::error::ServiceError;
use crate::types::AudioFileRecord;
use async_trait::async_trait;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Audio extensions recognised by the scanner
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "flac", "shn", "wav", "aiff", "aif", "mp3", "m4a", "ogg", "opus", "wv", "ape",
];

/// Text extensions loaded as info files
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "nfo", "md"];

/// Default cap on a single text file
const DEFAULT_MAX_TEXT_BYTES: u64 = 256 * 1024;

/// Local scanner over an extracted directory
#[derive(Debug, Clone)]
pub struct LocalMediaScanner {
    ignore_patterns: Vec<String>,
    max_text_bytes: u64,
}

impl Default for LocalMediaScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalMediaScanner {
    /// Scanner with default ignore patterns (`.DS_Store`, `__MACOSX`, ...)
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                "__MACOSX".to_string(),
                ".git".to_string(),
            ],
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }

    /// Override the per-file text size cap
    pub fn with_max_text_bytes(mut self, max_text_bytes: u64) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.ignore_patterns.iter().any(|pattern| name == pattern.as_str())
    }

    fn files_with_extension(&self, dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_extension(entry.path(), extensions))
            .map(DirEntry::into_path)
            .collect()
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Relative path with forward slashes
fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Read title/track/disc tags, falling back to an untagged record
pub fn read_audio_record(path: &Path) -> AudioFileRecord {
    let mut record = AudioFileRecord::new(path);

    let tagged_file = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged_file) => tagged_file,
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "No readable tags");
            return record;
        }
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        record.tag_title = tag
            .title()
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty());
        record.track_number = tag.track();
        record.disc_number = tag.disk();
    }

    tracing::debug!(
        file = %path.display(),
        title = ?record.tag_title,
        track = ?record.track_number,
        disc = ?record.disc_number,
        "Read audio tags"
    );

    record
}

fn join_error(e: tokio::task::JoinError) -> ServiceError {
    ServiceError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Scanner task failed: {}", e),
    ))
}

#[async_trait]
impl MediaScanner for LocalMediaScanner {
    async fn read_text_files(&self, dir: &Path) -> Result<BTreeMap<String, String>, ServiceError> {
        let scanner = self.clone();
        let root = dir.to_path_buf();

        tokio::task::spawn_blocking(move || -> Result<BTreeMap<String, String>, ServiceError> {
            let mut contents = BTreeMap::new();
            for path in scanner.files_with_extension(&root, TEXT_EXTENSIONS) {
                let size = std::fs::metadata(&path)?.len();
                if size > scanner.max_text_bytes {
                    tracing::debug!(file = %path.display(), size, "Skipping oversized text file");
                    continue;
                }
                let bytes = std::fs::read(&path)?;
                let text = String::from_utf8_lossy(&bytes).into_owned();
                contents.insert(relative_key(&root, &path), text);
            }
            Ok(contents)
        })
        .await
        .map_err(join_error)?
    }

    async fn list_audio_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ServiceError> {
        if !dir.is_dir() {
            return Err(ServiceError::InvalidInput(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }
        let scanner = self.clone();
        let root = dir.to_path_buf();
        tokio::task::spawn_blocking(move || scanner.files_with_extension(&root, AUDIO_EXTENSIONS))
            .await
            .map_err(join_error)
    }

    async fn analyze_audio(&self, paths: &[PathBuf]) -> Result<Vec<AudioFileRecord>, ServiceError> {
        let paths = paths.to_vec();
        tokio::task::spawn_blocking(move || paths.iter().map(|path| read_audio_record(path)).collect())
            .await
            .map_err(join_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ph1997-11-22")).unwrap();
        fs::create_dir_all(dir.path().join("__MACOSX")).unwrap();
        fs::write(dir.path().join("ph1997-11-22/info.txt"), "Phish\n1997-11-22\n").unwrap();
        fs::write(dir.path().join("ph1997-11-22/d1t02.flac"), b"not audio").unwrap();
        fs::write(dir.path().join("ph1997-11-22/d1t01.flac"), b"not audio").unwrap();
        fs::write(dir.path().join("ph1997-11-22/cover.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("__MACOSX/._d1t01.flac"), b"junk").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_lists_audio_sorted_and_skips_ignored() {
        let dir = build_tree();
        let files = LocalMediaScanner::new().list_audio_files(dir.path()).await.unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["d1t01.flac", "d1t02.flac"]);
    }

    #[tokio::test]
    async fn test_reads_text_files_with_relative_keys() {
        let dir = build_tree();
        let texts = LocalMediaScanner::new().read_text_files(dir.path()).await.unwrap();

        assert_eq!(texts.len(), 1);
        assert_eq!(
            texts.get("ph1997-11-22/info.txt").map(String::as_str),
            Some("Phish\n1997-11-22\n")
        );
    }

    #[tokio::test]
    async fn test_oversized_text_skipped() {
        let dir = build_tree();
        let texts = LocalMediaScanner::new()
            .with_max_text_bytes(4)
            .read_text_files(dir.path())
            .await
            .unwrap();
        assert!(texts.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_audio_yields_untagged_record() {
        let dir = build_tree();
        let path = dir.path().join("ph1997-11-22/d1t01.flac");
        let records = LocalMediaScanner::new()
            .analyze_audio(&[path.clone()])
            .await
            .unwrap();

        assert_eq!(records, vec![AudioFileRecord::new(path)]);
    }
}
