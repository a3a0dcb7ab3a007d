use law_core::Strategy;
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::types::{Candidate, StrategyResult};

use super::{TOP_K_ARTICLES, TOP_K_CASES};

/// encode(query) → C2 search on both partitions; score = cosine (§4.8).
pub async fn execute(ctx: &RetrievalContext, query: &str) -> StrategyResult {
    let query_vec = match ctx.embedder.encode_one(query).await {
        Ok(v) => v,
        Err(e) => return StrategyResult::error(Strategy::BasicSemantic, e.to_string()),
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

    StrategyResult::ok(Strategy::BasicSemantic, articles, cases, serde_json::json!({"query_len": query.chars().count()}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use law_core::StageStatus;

    #[tokio::test]
    async fn returns_scored_candidates_for_both_partitions() {
        let ctx = test_context().await;
        let result = execute(&ctx, "故意伤害罪量刑标准").await;
        assert_eq!(result.status, StageStatus::Success);
        assert!(!result.articles.is_empty());
    }
}
