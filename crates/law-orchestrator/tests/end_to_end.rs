//! End-to-end pipeline scenarios (§8), exercised through the public `search` /
//! `load_more_cases` entry points against a small fixed corpus. Builds its own fixture
//! rather than reusing the crate's internal unit-test fixture, the way
//! `ploke-rag`'s own `tests/integration_tests.rs` sets up a fresh `Database` rather than
//! importing a sibling crate's private test helpers.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use law_core::{Document, Sentence, Strategy};
use law_embed::{EmbeddingProvider, LocalHashEmbedder};
use law_graph::{KnowledgeGraph, MappingRow};
use law_index::{Bm25Index, Partition};
use law_llm::{LlmClient, LlmError, LlmProvider};
use law_orchestrator::{AppContext, LoadMoreRequest, OrchestratorConfig, SearchRequest};
use law_rag::RetrievalContext;

#[derive(Debug)]
struct UnhealthyProvider;

#[async_trait]
impl LlmProvider for UnhealthyProvider {
    fn name(&self) -> &str {
        "unhealthy"
    }

    async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, LlmError> {
        Err(LlmError::Authentication)
    }
}

fn corpus() -> Vec<Document> {
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
            sentence: Sentence { months: 18, fine_amount: 0, death_penalty: false, life: false },
        },
        Document::Case {
            id: "case_2021_0002".into(),
            title: "被告人李某故意伤害案".into(),
            content: "李某酒后与邻居发生肢体冲突，致邻居轻微伤。".into(),
            case_id: "2021_0002".into(),
            accusations: BTreeSet::from(["故意伤害罪".to_string()]),
            relevant_articles: vec![234],
            sentence: Sentence { months: 6, fine_amount: 0, death_penalty: false, life: false },
        },
    ]
}

async fn build_context(config: OrchestratorConfig) -> AppContext {
    let embedder = Arc::new(LocalHashEmbedder::default());
    let docs = corpus();

    let mut article_vectors = Partition::new();
    let mut case_vectors = Partition::new();
    let mut article_texts = Vec::new();
    let mut case_texts = Vec::new();
    let mut documents = HashMap::new();

    for doc in &docs {
        let text = doc.searchable_text();
        let vec = embedder.encode_one(&text).await.expect("embedding never fails for the hash embedder");
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

    let mapping = vec![
        MappingRow { case_id: "2021_0001".into(), article_number: 234, confidence: 0.9, is_primary: true },
        MappingRow { case_id: "2021_0002".into(), article_number: 234, confidence: 0.8, is_primary: true },
    ];
    let mut accusations = BTreeMap::new();
    accusations.insert("2021_0001".to_string(), BTreeSet::from(["故意伤害罪".to_string()]));
    accusations.insert("2021_0002".to_string(), BTreeSet::from(["故意伤害罪".to_string()]));
    let graph = Arc::new(KnowledgeGraph::build(mapping, &accusations));

    let llm = Arc::new(LlmClient::new(Arc::new(UnhealthyProvider), None, 0.0));

    let retrieval = RetrievalContext {
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
    };

    AppContext::from_retrieval_context(retrieval, config)
}

/// §8 "basic flow": a criminal-law query with an identifiable crime returns a ranked
/// article, at least one supporting case, a synthesized answer, and a complete trace.
#[tokio::test]
async fn full_pipeline_returns_ranked_results_with_trace() {
    let ctx = build_context(OrchestratorConfig::default()).await;
    let response = law_orchestrator::search(&ctx, SearchRequest::new("故意伤害他人致轻伤怎么判"))
        .await
        .expect("a known crime should always yield at least one result");

    assert!(!response.partial);
    assert!(response.articles.iter().any(|a| a.id == "article_234"));
    assert!(!response.cases.is_empty());
    assert!(!response.final_answer.is_empty());
    assert!(response.trace.searches.contains_key(&Strategy::KnowledgeGraph));
    assert!(response
        .trace
        .searches
        .values()
        .all(|stage| !matches!(stage.status, law_core::StageStatus::Pending | law_core::StageStatus::Running)));
}

/// §8 "load more": the second page of cases comes from the pagination cache, not a
/// rerun of the pipeline, and is internally consistent with the first page.
#[tokio::test]
async fn load_more_cases_pages_through_the_cached_fused_list() {
    let ctx = build_context(OrchestratorConfig::default()).await;
    let query = "故意伤害他人致轻伤怎么判";
    let response = law_orchestrator::search(&ctx, SearchRequest::new(query)).await.unwrap();
    assert!(!response.cases.is_empty());

    let page = law_orchestrator::load_more_cases(&ctx, LoadMoreRequest { query: query.to_string(), offset: 0, limit: 1 })
        .await
        .expect("a prior search must have populated the pagination cache");
    assert_eq!(page.cases.len(), 1);
    assert_eq!(page.returned_count, 1);
}

/// §8 "deadline": an unreasonably tight Stage 4 deadline either still returns a partial
/// result (if something raced in under the wire) or is reported as a timed-out request;
/// it must never hang or panic.
#[tokio::test]
async fn tight_deadline_degrades_gracefully() {
    let mut config = OrchestratorConfig::default();
    config.stage4_deadline = std::time::Duration::from_nanos(1);
    let ctx = build_context(config).await;

    match law_orchestrator::search(&ctx, SearchRequest::new("故意伤害他人致轻伤怎么判")).await {
        Ok(response) => assert!(response.partial),
        Err(err) => assert_eq!(err.status_code(), 504),
    }
}

/// §8 "empty query": request validation rejects before any stage runs.
#[tokio::test]
async fn blank_query_is_rejected_before_any_stage_runs() {
    let ctx = build_context(OrchestratorConfig::default()).await;
    let err = law_orchestrator::search(&ctx, SearchRequest::new("   ")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

/// §8 "llm disabled": a request with `enable_llm: false` still returns ranked articles
/// and a deterministic (non-LLM) answer, and never selects an LLM-backed strategy.
#[tokio::test]
async fn disabling_llm_skips_llm_backed_strategies_but_still_answers() {
    let ctx = build_context(OrchestratorConfig::default()).await;
    let mut request = SearchRequest::new("故意伤害他人致轻伤怎么判");
    request.enable_llm = false;

    let response = law_orchestrator::search(&ctx, request).await.unwrap();
    assert!(response.articles.iter().any(|a| a.id == "article_234"));
    assert!(!response.trace.searches.contains_key(&Strategy::LlmEnhanced));
    assert!(!response.trace.searches.contains_key(&Strategy::Query2docEnhanced));
    assert!(!response.trace.searches.contains_key(&Strategy::HydeEnhanced));
}
