use std::collections::HashMap;
use std::sync::Arc;

use law_core::{Document, DocId};
use law_embed::EmbeddingProvider;
use law_graph::KnowledgeGraph;
use law_index::{Bm25Index, Partition};
use law_llm::LlmClient;

/// Everything a strategy, the Router, or Query Understanding needs to read. Built once
/// at startup and shared read-only across concurrent requests (§5 "Shared resources").
pub struct RetrievalContext {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub article_vectors: Arc<Partition>,
    pub case_vectors: Arc<Partition>,
    pub article_bm25: Arc<Bm25Index>,
    pub case_bm25: Arc<Bm25Index>,
    pub graph: Arc<KnowledgeGraph>,
    pub llm: Arc<LlmClient>,
    pub documents: Arc<HashMap<DocId, Document>>,
    /// Document frequency per BM25 token across the whole corpus, for the Extraction
    /// sub-operation's TF-IDF keyword weighting (§4.6).
    pub term_doc_freq: Arc<HashMap<String, u32>>,
    pub total_docs: usize,
}

impl RetrievalContext {
    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }
}
