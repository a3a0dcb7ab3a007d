//! Fixtures for this crate's orchestrator tests. Not compiled outside `#[cfg(test)]`.
#![cfg(test)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use law_core::Document;
use law_embed::LocalHashEmbedder;
use law_graph::{KnowledgeGraph, MappingRow};
use law_index::{Bm25Index, Partition};
use law_llm::{LlmClient, LlmError, LlmProvider};
use law_rag::RetrievalContext;

use crate::context::{AppContext, OrchestratorConfig};

#[derive(Debug)]
struct AlwaysFailProvider;

#[async_trait]
impl LlmProvider for AlwaysFailProvider {
    fn name(&self) -> &str {
        "test-fail"
    }

    async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, LlmError> {
        Err(LlmError::Authentication)
    }
}

fn sample_documents() -> Vec<Document> {
    vec![
        Document::Article {
            id: "article_234".into(),
            title: "故意伤害罪".into(),
            content: "故意伤害他人身体的，处三年以下有期徒刑、拘役或者管制。".into(),
            article_number: 234,
            chapter: "侵犯公民人身权利罪".into(),
        },
        Document::Article {
            id: "article_264".into(),
            title: "盗窃罪".into(),
            content: "盗窃公私财物，数额较大的，处三年以下有期徒刑、拘役或者管制。".into(),
            article_number: 264,
            chapter: "侵犯财产罪".into(),
        },
        Document::Case {
            id: "case_2021_0001".into(),
            title: "被告人张某故意伤害案".into(),
            content: "张某因琐事与被害人发生争执，持械将其打伤，经鉴定为轻伤二级。".into(),
            case_id: "2021_0001".into(),
            accusations: BTreeSet::from(["故意伤害罪".to_string()]),
            relevant_articles: vec![234],
            sentence: law_core::Sentence { months: 18, fine_amount: 0, death_penalty: false, life: false },
        },
    ]
}

async fn test_retrieval_context() -> RetrievalContext {
    let embedder = Arc::new(LocalHashEmbedder::default());
    let docs = sample_documents();

    let mut article_vectors = Partition::new();
    let mut case_vectors = Partition::new();
    let mut article_texts = Vec::new();
    let mut case_texts = Vec::new();
    let mut documents = HashMap::new();

    for doc in &docs {
        let text = doc.searchable_text();
        let vec = law_embed::EmbeddingProvider::encode_one(embedder.as_ref(), &text)
            .await
            .unwrap();
        match doc {
            Document::Article { .. } => {
                article_vectors.push(doc.id().to_string(), vec);
                article_texts.push((doc.id().to_string(), text));
            }
            Document::Case { .. } => {
                case_vectors.push(doc.id().to_string(), vec);
                case_texts.push((doc.id().to_string(), text));
            }
        }
        documents.insert(doc.id().to_string(), doc.clone());
    }

    let article_bm25 = Bm25Index::build(article_texts, vec!["的".to_string()]);
    let case_bm25 = Bm25Index::build(case_texts, vec!["的".to_string()]);

    let mapping = vec![MappingRow { case_id: "2021_0001".into(), article_number: 234, confidence: 0.9, is_primary: true }];
    let mut accusations = BTreeMap::new();
    accusations.insert("2021_0001".to_string(), BTreeSet::from(["故意伤害罪".to_string()]));
    let graph = Arc::new(KnowledgeGraph::build(mapping, &accusations));

    let llm = Arc::new(LlmClient::new(Arc::new(AlwaysFailProvider), None, 0.0));

    RetrievalContext {
        embedder,
        article_vectors: Arc::new(article_vectors),
        case_vectors: Arc::new(case_vectors),
        article_bm25: Arc::new(article_bm25),
        case_bm25: Arc::new(case_bm25),
        graph,
        llm,
        documents: Arc::new(documents),
        term_doc_freq: Arc::new(HashMap::new()),
        total_docs: docs.len(),
    }
}

/// A ready-to-query [`AppContext`] over a small fixed corpus, with the LLM deliberately
/// unhealthy so tests are deterministic regardless of `enable_llm`.
pub async fn test_app_context(config: OrchestratorConfig) -> AppContext {
    AppContext::from_retrieval_context(test_retrieval_context().await, config)
}
