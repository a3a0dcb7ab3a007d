//! Process-wide `AppContext`: wires C1-C9 together (Design Notes "Global mutable
//! state"), loads the on-disk artifacts (§6), and exposes the one mutation point that
//! survives startup: the LLM cache, encapsulated inside `law_llm::LlmClient` itself.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use law_core::Document;
use law_graph::KnowledgeGraph;
use law_index::bm25::ChineseTokenizer;
use law_index::{artifact, Bm25Index, Partition};
use law_llm::LlmClient;
use law_rag::RetrievalContext;
use tokio::sync::RwLock;

use crate::events::EventBus;
use crate::pagination::PaginationCache;
use crate::readiness::{self, ServiceState};

/// Orchestration-level knobs (§4.10, §5). Distinct from `law_llm::LlmClient`'s own
/// timeout/retry knobs, which are a C5 concern.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Stage 4's global deadline across all selected strategies (§4.10).
    pub stage4_deadline: Duration,
    /// Per-strategy timeout, treated identically to a strategy failure (§4.8).
    pub strategy_timeout: Duration,
    /// Caps concurrent strategy tasks; bounded at 8 regardless of how many
    /// strategies were selected (§5).
    pub concurrency_cap: usize,
    pub event_buffer: usize,
    pub pagination_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stage4_deadline: Duration::from_secs(15),
            strategy_timeout: Duration::from_secs(8),
            concurrency_cap: 8,
            event_buffer: crate::events::DEFAULT_BUFFER,
            pagination_ttl: crate::pagination::DEFAULT_TTL,
        }
    }
}

/// Everything the Orchestrator needs for the lifetime of the process: the read-shared
/// retrieval context (C1-C5 handles, documents, BM25/vector indexes, KG), the event
/// bus, the pagination cache, and the readiness gate.
pub struct AppContext {
    pub retrieval: Arc<RetrievalContext>,
    pub config: OrchestratorConfig,
    pub events: Arc<EventBus>,
    pub pagination: Arc<PaginationCache>,
    state: RwLock<ServiceState>,
}

impl AppContext {
    pub fn state_ready(&self) -> bool {
        // Best-effort synchronous peek; callers that need a guaranteed-fresh read use
        // `state()`. Readiness only ever transitions once, at startup, so a stale read
        // here cannot observe a service flip from ready back to not-ready.
        self.state.try_read().map(|s| s.is_ready()).unwrap_or(false)
    }

    pub async fn state(&self) -> ServiceState {
        self.state.read().await.clone()
    }

    /// Load every on-disk artifact in §6's layout and wire C1-C9 into one
    /// `AppContext`. Returns `Err` (and leaves the context in `Failed` state, never
    /// constructed) on any artifact mismatch: per §3, the service must refuse to
    /// become ready rather than serve from a partially-consistent index.
    pub async fn bootstrap(
        data_dir: &Path,
        embedder: Arc<dyn law_embed::EmbeddingProvider>,
        llm: Arc<LlmClient>,
        config: OrchestratorConfig,
    ) -> Result<Self, law_error::Error> {
        let articles = artifact::load_documents_json(&data_dir.join("articles.json")).map_err(law_error::Error::from)?;
        let cases = artifact::load_documents_json(&data_dir.join("cases.json")).map_err(law_error::Error::from)?;

        let article_vectors = artifact::load_partition(
            &data_dir.join("vectors/articles.bin"),
            &data_dir.join("vectors/articles.json"),
        )
        .map_err(law_error::Error::from)?;
        let case_vectors = artifact::load_partition(
            &data_dir.join("vectors/cases.bin"),
            &data_dir.join("vectors/cases.json"),
        )
        .map_err(law_error::Error::from)?;

        let article_texts: Vec<(String, String)> =
            articles.iter().map(|d| (d.id().to_string(), d.searchable_text())).collect();
        let case_texts: Vec<(String, String)> = cases.iter().map(|d| (d.id().to_string(), d.searchable_text())).collect();
        let article_bm25 = Bm25Index::build(article_texts, Vec::new());
        let case_bm25 = Bm25Index::build(case_texts, Vec::new());

        readiness::check_partition("articles", &article_vectors, &article_bm25).map_err(|reason| {
            law_error::Error::Fatal(law_error::FatalError::ArtifactCorruption { component: "articles".to_string(), reason })
        })?;
        readiness::check_partition("cases", &case_vectors, &case_bm25).map_err(|reason| {
            law_error::Error::Fatal(law_error::FatalError::ArtifactCorruption { component: "cases".to_string(), reason })
        })?;

        let mapping = artifact::load_mapping_csv(&data_dir.join("kg/mapping.csv")).map_err(law_error::Error::from)?;
        let case_accusations: BTreeMap<String, BTreeSet<String>> = cases
            .iter()
            .filter_map(|d| match d {
                Document::Case { case_id, accusations, .. } => Some((case_id.clone(), accusations.clone())),
                Document::Article { .. } => None,
            })
            .collect();
        let mapping_rows = mapping.into_iter().map(|r| law_graph::MappingRow {
            case_id: r.case_id,
            article_number: r.article_number,
            confidence: r.confidence,
            is_primary: r.is_primary,
        });
        let graph = Arc::new(KnowledgeGraph::build(mapping_rows, &case_accusations));

        let tokenizer = ChineseTokenizer::new();
        let mut term_doc_freq: HashMap<String, u32> = HashMap::new();
        let mut total_docs = 0usize;
        for doc in articles.iter().chain(cases.iter()) {
            total_docs += 1;
            let mut seen = std::collections::HashSet::new();
            for tok in tokenizer.tokenize_str(&doc.searchable_text()) {
                if seen.insert(tok.clone()) {
                    *term_doc_freq.entry(tok).or_insert(0) += 1;
                }
            }
        }

        let mut documents = HashMap::with_capacity(articles.len() + cases.len());
        for doc in articles.into_iter().chain(cases.into_iter()) {
            documents.insert(doc.id().to_string(), doc);
        }

        let retrieval = Arc::new(RetrievalContext {
            embedder,
            article_vectors: Arc::new(article_vectors),
            case_vectors: Arc::new(case_vectors),
            article_bm25: Arc::new(article_bm25),
            case_bm25: Arc::new(case_bm25),
            graph,
            llm,
            documents: Arc::new(documents),
            term_doc_freq: Arc::new(term_doc_freq),
            total_docs,
        });

        Ok(Self {
            retrieval,
            events: Arc::new(EventBus::new(config.event_buffer)),
            pagination: Arc::new(PaginationCache::new(config.pagination_ttl)),
            state: RwLock::new(ServiceState::Ready),
            config,
        })
    }

    /// Build directly from an already-assembled [`RetrievalContext`], bypassing
    /// artifact loading — used by tests and by callers that construct the corpus
    /// in-process rather than from `DATA_DIR`.
    pub fn from_retrieval_context(retrieval: RetrievalContext, config: OrchestratorConfig) -> Self {
        Self {
            retrieval: Arc::new(retrieval),
            events: Arc::new(EventBus::new(config.event_buffer)),
            pagination: Arc::new(PaginationCache::new(config.pagination_ttl)),
            state: RwLock::new(ServiceState::Ready),
            config,
        }
    }
}
