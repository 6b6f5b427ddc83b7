//! Directory pass-through extractor
//!
//! Archive formats are handled upstream; this extractor accepts a directory
//! that already holds the archive contents and rejects anything else.

use super::ArchiveExtractor;
use crate::error::ServiceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Accepts already-extracted directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryExtractor;

#[async_trait]
impl ArchiveExtractor for DirectoryExtractor {
    async fn extract(&self, path: &Path) -> Result<PathBuf, ServiceError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServiceError::InvalidInput(format!(
                    "Path not found: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(ServiceError::Io(e)),
        };

        if metadata.is_dir() {
            tracing::debug!(path = %path.display(), "Using directory as extracted tree");
            Ok(path.to_path_buf())
        } else {
            Err(ServiceError::Unsupported(format!(
                "Archive extraction is not available for {}",
                path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let extracted = DirectoryExtractor.extract(dir.path()).await.unwrap();
        assert_eq!(extracted, dir.path());
    }

    #[tokio::test]
    async fn test_plain_file_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("show.zip");
        std::fs::write(&file, b"PK").unwrap();

        let result = DirectoryExtractor.extract(&file).await;
        assert!(matches!(result, Err(ServiceError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_missing_path_is_invalid_input() {
        let result = DirectoryExtractor
            .extract(Path::new("/definitely/not/here.zip"))
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }
}
