//! Archive structure strategy
//!
//! Two language-model calls:
//! 1. Read the extracted layout and pick manifest files
//! 2. Extract show info from those manifests plus the audio file names
//!
//! The model's 0.0-1.0 confidence is rescaled to 0-100 on entry; answers
//! below the configured minimum are discarded.

use crate::error::StrategyError;
use crate::services::{ShowInfoExtractionRequest, StructureRequest};
use crate::types::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, StrategyCapabilities,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Upper bound on entries sent to the model
const MAX_ENTRIES: usize = 500;

/// Relative paths under `root`, sorted, directories included
fn list_entries(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .take(MAX_ENTRIES)
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                format!("{}/", relative)
            } else {
                relative
            }
        })
        .collect()
}

/// Relative path with no `..`, root or prefix components
fn is_relative_inside(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Rescale a 0.0-1.0 confidence to 0-100
pub fn rescale_confidence(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Show info extracted by a language model from the archive's manifests
#[derive(Debug, Clone, Default)]
pub struct ArchiveStructureStrategy;

impl ArchiveStructureStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Manifest contents: scanned text first, otherwise read from disk
    ///
    /// Names that leave `root`, lexically or through a symlink, are skipped.
    async fn load_manifests(
        ctx: &IdentificationContext,
        root: &Path,
        manifest_files: &[String],
    ) -> BTreeMap<String, String> {
        let mut manifests = BTreeMap::new();
        let canonical_root = tokio::fs::canonicalize(root).await.ok();
        for name in manifest_files {
            if !is_relative_inside(name) {
                debug!(file = %name, "Manifest path outside the archive, skipping");
                continue;
            }
            if let Some(text) = ctx.text_files.get(name) {
                manifests.insert(name.clone(), text.clone());
                continue;
            }
            let path: PathBuf = root.join(name);
            let inside = match (&canonical_root, tokio::fs::canonicalize(&path).await) {
                (Some(canonical_root), Ok(resolved)) => resolved.starts_with(canonical_root),
                _ => false,
            };
            if !inside {
                debug!(file = %path.display(), "Manifest missing or outside the archive, skipping");
                continue;
            }
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    manifests.insert(name.clone(), String::from_utf8_lossy(&bytes).into_owned());
                }
                Err(e) => debug!(file = %path.display(), error = %e, "Manifest not readable"),
            }
        }
        manifests
    }
}

#[async_trait]
impl EvidenceStrategy for ArchiveStructureStrategy {
    fn name(&self) -> &'static str {
        "archive_structure"
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::extraction_and_llm()
    }

    async fn identify(
        &self,
        ctx: &IdentificationContext,
    ) -> Result<Option<IdentificationResult>, StrategyError> {
        let llm = ctx.llm.as_ref().ok_or(StrategyError::MissingCapability("llm"))?;
        let root = ctx
            .extracted_dir
            .clone()
            .ok_or(StrategyError::MissingCapability("extraction"))?;

        let walk_root = root.clone();
        let entries = tokio::task::spawn_blocking(move || list_entries(&walk_root))
            .await
            .map_err(|e| StrategyError::Internal(format!("Directory walk failed: {}", e)))?;

        let suggestion = llm
            .analyze_archive_structure(&StructureRequest {
                archive_name: ctx.filename.clone(),
                entries,
            })
            .await?;

        let manifests = Self::load_manifests(ctx, &root, &suggestion.manifest_files).await;

        let extraction = llm
            .extract_show_info(&ShowInfoExtractionRequest {
                archive_name: ctx.filename.clone(),
                audio_file_names: ctx.audio_files.iter().map(|file| file.file_name()).collect(),
                manifests: manifests.clone(),
                structure_notes: suggestion.notes.clone(),
            })
            .await?;

        if extraction.confidence.is_nan() || extraction.confidence < ctx.config.llm_min_confidence {
            debug!(
                confidence = extraction.confidence,
                minimum = ctx.config.llm_min_confidence,
                "Model answer below minimum confidence"
            );
            return Ok(None);
        }
        if extraction.show_info.is_empty() {
            debug!("Model returned no show fields");
            return Ok(None);
        }

        let mut evidence = vec![format!(
            "Model confidence {:.2} from {} manifest file(s)",
            extraction.confidence,
            manifests.len()
        )];
        evidence.extend(manifests.keys().map(|name| format!("Manifest {}", name)));
        if let Some(directory) = &suggestion.show_directory {
            evidence.push(format!("Show directory {}", directory));
        }
        if let Some(notes) = &suggestion.notes {
            evidence.push(format!("Structure notes: {}", notes));
        }

        let mut result = IdentificationResult::new(
            self.name(),
            extraction.show_info,
            rescale_confidence(extraction.confidence),
        )
        .with_evidence(evidence);
        result.reasoning = extraction.reasoning;

        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::services::{LlmService, ShowInfoExtractionResult, StructureSuggestion};
    use crate::types::ShowInfo;
    use showid_common::config::IdentifyConfig;
    use std::sync::{Arc, Mutex};

    struct ScriptedLlm {
        confidence: f64,
        manifest_files: Option<Vec<String>>,
        seen_manifests: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(confidence: f64) -> Arc<Self> {
            Arc::new(Self {
                confidence,
                manifest_files: None,
                seen_manifests: Mutex::new(Vec::new()),
            })
        }

        fn suggesting(confidence: f64, manifest_files: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                confidence,
                manifest_files: Some(manifest_files.iter().map(|name| name.to_string()).collect()),
                seen_manifests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmService for ScriptedLlm {
        async fn analyze_archive_structure(
            &self,
            request: &StructureRequest,
        ) -> Result<StructureSuggestion, ServiceError> {
            Ok(StructureSuggestion {
                show_directory: None,
                manifest_files: self.manifest_files.clone().unwrap_or_else(|| {
                    request
                        .entries
                        .iter()
                        .filter(|entry| entry.ends_with(".txt"))
                        .cloned()
                        .collect()
                }),
                notes: Some("single show".to_string()),
            })
        }

        async fn extract_show_info(
            &self,
            request: &ShowInfoExtractionRequest,
        ) -> Result<ShowInfoExtractionResult, ServiceError> {
            *self.seen_manifests.lock().unwrap() = request.manifests.keys().cloned().collect();
            Ok(ShowInfoExtractionResult {
                show_info: ShowInfo {
                    artist: Some("Phish".to_string()),
                    date: Some("1997-11-22".to_string()),
                    ..Default::default()
                },
                confidence: self.confidence,
                reasoning: Some("info.txt names the show".to_string()),
            })
        }
    }

    fn context(llm: Arc<ScriptedLlm>, dir: &Path) -> IdentificationContext {
        let mut ctx = IdentificationContext::new(dir, IdentifyConfig::default());
        ctx.extracted_dir = Some(dir.to_path_buf());
        ctx.llm = Some(llm);
        ctx
    }

    fn show_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("info.txt"), "Phish 1997-11-22").unwrap();
        std::fs::write(dir.path().join("d1t01.flac"), b"audio").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_rescales_confidence() {
        let dir = show_dir();
        let llm = ScriptedLlm::new(0.874);

        let result = ArchiveStructureStrategy
            .identify(&context(llm.clone(), dir.path()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.confidence, 87);
        assert_eq!(result.reasoning.as_deref(), Some("info.txt names the show"));
        assert_eq!(*llm.seen_manifests.lock().unwrap(), vec!["info.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_manifests_outside_archive_are_not_read() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "not part of the show").unwrap();
        let show = outer.path().join("show");
        std::fs::create_dir(&show).unwrap();
        std::fs::write(show.join("info.txt"), "Phish 1997-11-22").unwrap();
        let absolute = outer.path().join("secret.txt").to_string_lossy().into_owned();
        let llm = ScriptedLlm::suggesting(
            0.9,
            &["../secret.txt", absolute.as_str(), "/etc/hostname", "info.txt"],
        );

        let result = ArchiveStructureStrategy
            .identify(&context(llm.clone(), &show))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(*llm.seen_manifests.lock().unwrap(), vec!["info.txt".to_string()]);
        assert!(result.evidence.iter().all(|line| !line.contains("secret")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_manifest_outside_archive_is_not_read() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "not part of the show").unwrap();
        let show = outer.path().join("show");
        std::fs::create_dir(&show).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), show.join("notes.txt")).unwrap();
        let llm = ScriptedLlm::suggesting(0.9, &["notes.txt"]);

        ArchiveStructureStrategy
            .identify(&context(llm.clone(), &show))
            .await
            .unwrap();

        assert!(llm.seen_manifests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_relative_inside_check() {
        assert!(is_relative_inside("info.txt"));
        assert!(is_relative_inside("./disc1/info.txt"));
        assert!(!is_relative_inside("../secret.txt"));
        assert!(!is_relative_inside("disc1/../../secret.txt"));
        assert!(!is_relative_inside("/etc/hostname"));
        assert!(!is_relative_inside(""));
    }

    #[tokio::test]
    async fn test_rejects_below_minimum() {
        let dir = show_dir();
        let llm = ScriptedLlm::new(0.59);

        let result = ArchiveStructureStrategy
            .identify(&context(llm, dir.path()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_accepts_exact_minimum() {
        let dir = show_dir();
        let llm = ScriptedLlm::new(0.6);

        let result = ArchiveStructureStrategy
            .identify(&context(llm, dir.path()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.confidence, 60);
    }

    #[tokio::test]
    async fn test_missing_llm_is_an_error() {
        let dir = show_dir();
        let mut ctx = IdentificationContext::new(dir.path(), IdentifyConfig::default());
        ctx.extracted_dir = Some(dir.path().to_path_buf());

        let result = ArchiveStructureStrategy.identify(&ctx).await;
        assert!(matches!(result, Err(StrategyError::MissingCapability("llm"))));
    }

    #[test]
    fn test_rescale_clamps() {
        assert_eq!(rescale_confidence(1.7), 100);
        assert_eq!(rescale_confidence(-0.2), 0);
        assert_eq!(rescale_confidence(0.625), 63);
    }
}
