use law_core::Strategy;
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::types::{Candidate, Extraction, StrategyResult};

use super::{TOP_K_ARTICLES, TOP_K_CASES};

/// encode the hypothetical answer → C2 search; score = cosine (§4.8).
pub async fn execute(ctx: &RetrievalContext, extraction: &Extraction) -> StrategyResult {
    if extraction.hyde_hypothetical.is_empty() {
        return StrategyResult::error(Strategy::HydeEnhanced, "hypothetical answer unavailable");
    }

    let query_vec = match ctx.embedder.encode_one(&extraction.hyde_hypothetical).await {
        Ok(v) => v,
        Err(e) => return StrategyResult::error(Strategy::HydeEnhanced, e.to_string()),
    };

    let articles = ctx
        .article_vectors
        .search(&query_vec, TOP_K_ARTICLES)
        .into_iter()
        .map(|(doc_id, score)| Candidate { doc_id, score, debug: serde_json::json!({"metric": "cosine"}) })
        .collect();
    let cases = ctx
        .case_vectors
        .search(&query_vec, TOP_K_CASES)
        .into_iter()
        .map(|(doc_id, score)| Candidate { doc_id, score, debug: serde_json::json!({"metric": "cosine"}) })
        .collect();

    StrategyResult::ok(Strategy::HydeEnhanced, articles, cases, serde_json::Value::Null)
}
