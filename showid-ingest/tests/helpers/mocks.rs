//! Scripted strategies and collaborators

use async_trait::async_trait;
use showid_ingest::error::{ServiceError, StrategyError};
use showid_ingest::services::{
    LlmService, SearchQuery, SearchResponse, SearchResult, ShowInfoExtractionRequest,
    ShowInfoExtractionResult, StructureRequest, StructureSuggestion, WebSearchService,
};
use showid_ingest::{
    EvidenceStrategy, IdentificationContext, IdentificationResult, ShowInfo, StrategyCapabilities,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Script {
    Found(ShowInfo, u32),
    Nothing,
    Fail,
    Panic,
    Hang,
}

/// Strategy with a fixed outcome
pub struct ScriptedStrategy {
    name: &'static str,
    capabilities: StrategyCapabilities,
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedStrategy {
    fn with_script(name: &'static str, script: Script) -> Self {
        Self {
            name,
            capabilities: StrategyCapabilities::NONE,
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn found(name: &'static str, show_info: ShowInfo, confidence: u32) -> Self {
        Self::with_script(name, Script::Found(show_info, confidence))
    }

    pub fn nothing(name: &'static str) -> Self {
        Self::with_script(name, Script::Nothing)
    }

    pub fn failing(name: &'static str) -> Self {
        Self::with_script(name, Script::Fail)
    }

    pub fn panicking(name: &'static str) -> Self {
        Self::with_script(name, Script::Panic)
    }

    pub fn hanging(name: &'static str) -> Self {
        Self::with_script(name, Script::Hang)
    }

    pub fn requiring(mut self, capabilities: StrategyCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvidenceStrategy for ScriptedStrategy {
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Found(show_info, confidence) => Ok(Some(
                IdentificationResult::new(self.name, show_info.clone(), *confidence)
                    .with_evidence(vec![format!("{} evidence", self.name)]),
            )),
            Script::Nothing => Ok(None),
            Script::Fail => Err(ServiceError::Provider("scripted failure".to_string()).into()),
            Script::Panic => panic!("scripted panic in {}", self.name),
            Script::Hang => {
                futures::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

/// Language model returning a fixed answer
pub struct ScriptedLlm {
    pub show_info: ShowInfo,
    pub confidence: f64,
    pub requests: Mutex<Vec<ShowInfoExtractionRequest>>,
}

impl ScriptedLlm {
    pub fn new(show_info: ShowInfo, confidence: f64) -> Arc<Self> {
        Arc::new(Self {
            show_info,
            confidence,
            requests: Mutex::new(Vec::new()),
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
            manifest_files: request
                .entries
                .iter()
                .filter(|entry| entry.ends_with(".txt") || entry.ends_with(".md5"))
                .cloned()
                .collect(),
            notes: None,
        })
    }

    async fn extract_show_info(
        &self,
        request: &ShowInfoExtractionRequest,
    ) -> Result<ShowInfoExtractionResult, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ShowInfoExtractionResult {
            show_info: self.show_info.clone(),
            confidence: self.confidence,
            reasoning: Some("scripted".to_string()),
        })
    }
}

/// Web search returning fixed hits
pub struct CannedSearch {
    pub results: Vec<SearchResult>,
    pub queries: Mutex<Vec<SearchQuery>>,
}

impl CannedSearch {
    pub fn new(hits: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            results: hits
                .iter()
                .map(|(title, description)| SearchResult {
                    title: title.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl WebSearchService for CannedSearch {
    async fn search_concert(&self, query: &SearchQuery) -> Result<SearchResponse, ServiceError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(SearchResponse {
            results: self.results.clone(),
        })
    }
}
