//! Show Identification Orchestrator
//!
//! Runs every registered evidence strategy against one archive and fuses the
//! results into a ranked candidate list.
//!
//! # Architecture
//! 1. **Context** - built once; the archive is extracted and scanned once,
//!    and only if some registered strategy needs it
//! 2. **Eligibility** - strategies missing a capability are skipped (debug)
//! 3. **Concurrent run** - all eligible strategies run together, each under a
//!    timeout and panic guard; failures are logged and dropped
//! 4. **Ranking** - stable sort by confidence (ties keep registration order)
//! 5. **Consolidation** - similar candidates merge (see [`consolidation`])
//!
//! No strategy failure ever fails the run; zero results is an empty list.

pub mod consolidation;
pub mod strategies;

pub use consolidation::{consolidate, is_similar, merge};
pub use strategies::default_strategies;

use crate::error::StrategyError;
use crate::services::{
    ArchiveExtractor, DirectoryExtractor, LlmService, LocalMediaScanner, MediaScanner,
    WebSearchService,
};
use crate::types::{EvidenceStrategy, IdentificationContext, IdentificationResult};
use futures::future::join_all;
use futures::FutureExt;
use showid_common::config::IdentifyConfig;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Orchestrates evidence strategies over one archive
///
/// # Example
/// ```rust,ignore
/// use showid_ingest::identification::ShowIdentifier;
///
/// let identifier = ShowIdentifier::with_default_strategies();
/// let candidates = identifier
///     .identify(Path::new("/incoming/ph1997-11-22"), &config.identify, None, None)
///     .await;
///
/// for candidate in &candidates {
///     println!("{} ({}): {:?}", candidate.source, candidate.confidence, candidate.show_info);
/// }
/// ```
pub struct ShowIdentifier {
    strategies: Vec<Arc<dyn EvidenceStrategy>>,
    extractor: Arc<dyn ArchiveExtractor>,
    scanner: Arc<dyn MediaScanner>,
}

impl ShowIdentifier {
    /// Create an orchestrator over the given strategies and collaborators
    pub fn new(
        strategies: Vec<Arc<dyn EvidenceStrategy>>,
        extractor: Arc<dyn ArchiveExtractor>,
        scanner: Arc<dyn MediaScanner>,
    ) -> Self {
        Self {
            strategies,
            extractor,
            scanner,
        }
    }

    /// Built-in strategies with the local directory extractor and scanner
    pub fn with_default_strategies() -> Self {
        Self::new(
            default_strategies(),
            Arc::new(DirectoryExtractor),
            Arc::new(LocalMediaScanner::new()),
        )
    }

    /// Get strategy count
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    fn needs_extraction(&self) -> bool {
        self.strategies
            .iter()
            .any(|strategy| strategy.capabilities().requires_extraction)
    }

    /// Build the shared context, extracting and scanning at most once
    ///
    /// Extraction or scanning failures are logged; strategies that need the
    /// extracted tree then become ineligible.
    pub async fn build_context(
        &self,
        archive_path: &Path,
        config: &IdentifyConfig,
        llm: Option<Arc<dyn LlmService>>,
        web_search: Option<Arc<dyn WebSearchService>>,
    ) -> IdentificationContext {
        let mut ctx = IdentificationContext::new(archive_path, config.clone());
        ctx.llm = llm;
        ctx.web_search = web_search;

        if !self.needs_extraction() {
            return ctx;
        }

        let dir = match self.extractor.extract(archive_path).await {
            Ok(dir) => dir,
            Err(e) => {
                warn!(
                    archive = %archive_path.display(),
                    error = %e,
                    "Extraction failed; strategies needing it will be skipped"
                );
                return ctx;
            }
        };

        ctx.text_files = match self.scanner.read_text_files(&dir).await {
            Ok(text_files) => text_files,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Reading text files failed");
                Default::default()
            }
        };

        let audio = match self.scanner.list_audio_files(&dir).await {
            Ok(paths) => self.scanner.analyze_audio(&paths).await,
            Err(e) => Err(e),
        };
        ctx.audio_files = audio.unwrap_or_else(|e| {
            warn!(dir = %dir.display(), error = %e, "Audio scan failed");
            Vec::new()
        });

        debug!(
            dir = %dir.display(),
            text_files = ctx.text_files.len(),
            audio_files = ctx.audio_files.len(),
            "Archive contents scanned"
        );
        ctx.extracted_dir = Some(dir);
        ctx
    }

    /// Identify the show in an archive
    ///
    /// # Returns
    /// Consolidated candidates, highest confidence first. Empty when no
    /// strategy found anything.
    pub async fn identify(
        &self,
        archive_path: &Path,
        config: &IdentifyConfig,
        llm: Option<Arc<dyn LlmService>>,
        web_search: Option<Arc<dyn WebSearchService>>,
    ) -> Vec<IdentificationResult> {
        let ctx = self.build_context(archive_path, config, llm, web_search).await;
        self.run_strategies(&ctx).await
    }

    /// Run eligible strategies against a prepared context and consolidate
    pub async fn run_strategies(&self, ctx: &IdentificationContext) -> Vec<IdentificationResult> {
        let (eligible, skipped): (Vec<Arc<dyn EvidenceStrategy>>, Vec<_>) = self
            .strategies
            .iter()
            .cloned()
            .partition(|strategy| ctx.satisfies(&strategy.capabilities()));

        for strategy in &skipped {
            debug!(
                strategy = strategy.name(),
                capabilities = ?strategy.capabilities(),
                "Strategy skipped (capability unavailable)"
            );
        }

        let limit = Duration::from_secs(ctx.config.strategy_timeout_secs);
        let futures = eligible.iter().map(|strategy| {
            async move {
                let name = strategy.name();
                match run_guarded(strategy, ctx, limit).await {
                    Ok(Some(result)) => {
                        debug!(strategy = name, confidence = result.confidence, "Strategy found evidence");
                        Some(result)
                    }
                    Ok(None) => {
                        debug!(strategy = name, "Strategy found no evidence");
                        None
                    }
                    Err(e) => {
                        warn!(
                            strategy = name,
                            error = %e,
                            "Strategy failed (excluded from results)"
                        );
                        None
                    }
                }
            }
        });

        let results: Vec<IdentificationResult> = join_all(futures).await.into_iter().flatten().collect();
        let found = results.len();
        let candidates = consolidate(results, ctx.config.agreement_bonus);

        info!(
            archive = %ctx.filename,
            strategies_run = eligible.len(),
            strategies_skipped = skipped.len(),
            results = found,
            candidates = candidates.len(),
            top_confidence = candidates.first().map(|c| c.confidence),
            "Identification complete"
        );

        candidates
    }
}

/// Invoke one strategy under a timeout, converting panics into errors
async fn run_guarded(
    strategy: &Arc<dyn EvidenceStrategy>,
    ctx: &IdentificationContext,
    limit: Duration,
) -> Result<Option<IdentificationResult>, StrategyError> {
    let guarded = AssertUnwindSafe(strategy.identify(ctx)).catch_unwind();
    match tokio::time::timeout(limit, guarded).await {
        Err(_) => Err(StrategyError::Timeout(limit)),
        Ok(Err(payload)) => Err(StrategyError::Panicked(panic_message(payload.as_ref()))),
        Ok(Ok(outcome)) => outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Top candidate, if its confidence reaches `threshold`
pub fn select_candidate(results: &[IdentificationResult], threshold: u8) -> Option<&IdentificationResult> {
    results.first().filter(|top| top.confidence >= threshold)
}

// ============================================================================
// Mock Strategy for Testing
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::types::{ShowInfo, StrategyCapabilities};
    use async_trait::async_trait;

    #[derive(Debug, Clone)]
    pub enum Behavior {
        Found(IdentificationResult),
        Nothing,
        Fail,
        Panic,
        Hang,
    }

    /// Mock strategy for testing
    pub struct MockStrategy {
        pub name: &'static str,
        pub capabilities: StrategyCapabilities,
        pub behavior: Behavior,
    }

    impl MockStrategy {
        pub fn new(name: &'static str, show_info: ShowInfo, confidence: u32) -> Self {
            Self {
                name,
                capabilities: StrategyCapabilities::NONE,
                behavior: Behavior::Found(IdentificationResult::new(name, show_info, confidence)),
            }
        }

        pub fn empty(name: &'static str) -> Self {
            Self::with_behavior(name, Behavior::Nothing)
        }

        pub fn failing(name: &'static str) -> Self {
            Self::with_behavior(name, Behavior::Fail)
        }

        pub fn with_behavior(name: &'static str, behavior: Behavior) -> Self {
            Self {
                name,
                capabilities: StrategyCapabilities::NONE,
                behavior,
            }
        }

        pub fn requiring(mut self, capabilities: StrategyCapabilities) -> Self {
            self.capabilities = capabilities;
            self
        }
    }

    #[async_trait]
    impl EvidenceStrategy for MockStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn capabilities(&self) -> StrategyCapabilities {
            self.capabilities
        }

        async fn identify(
            &self,
            _ctx: &IdentificationContext,
        ) -> Result<Option<IdentificationResult>, StrategyError> {
            match &self.behavior {
                Behavior::Found(result) => Ok(Some(result.clone())),
                Behavior::Nothing => Ok(None),
                Behavior::Fail => Err(StrategyError::Internal("Mock failure".to_string())),
                Behavior::Panic => panic!("mock strategy panicked"),
                Behavior::Hang => {
                    futures::future::pending::<()>().await;
                    Ok(None)
                }
            }
        }
    }
}
