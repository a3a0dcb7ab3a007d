use law_core::Strategy;
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::types::{Candidate, Extraction, StrategyResult};

use super::{TOP_K_ARTICLES, TOP_K_CASES};

const SEPARATOR: &str = " || ";

/// encode(`original || SEP || pseudo_doc`) → C2 search; score = cosine (§4.8). The
/// Router only selects this strategy when `query2doc_enhanced` is non-empty, but a
/// missing value here still degrades gracefully rather than panicking.
pub async fn execute(ctx: &RetrievalContext, query: &str, extraction: &Extraction) -> StrategyResult {
    if extraction.query2doc_enhanced.is_empty() {
        return StrategyResult::error(Strategy::Query2docEnhanced, "query2doc text unavailable");
    }

    let augmented = format!("{query}{SEPARATOR}{}", extraction.query2doc_enhanced);
    let query_vec = match ctx.embedder.encode_one(&augmented).await {
        Ok(v) => v,
        Err(e) => return StrategyResult::error(Strategy::Query2docEnhanced, e.to_string()),
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

    StrategyResult::ok(Strategy::Query2docEnhanced, articles, cases, serde_json::json!({"augmented_len": augmented.chars().count()}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use law_core::StageStatus;

    #[tokio::test]
    async fn empty_pseudo_doc_yields_error_status() {
        let ctx = test_context().await;
        let result = execute(&ctx, "盗窃罪", &Extraction::default()).await;
        assert_eq!(result.status, StageStatus::Error);
    }

    #[tokio::test]
    async fn non_empty_pseudo_doc_searches_both_partitions() {
        let ctx = test_context().await;
        let extraction = Extraction { query2doc_enhanced: "盗窃公私财物数额较大处三年以下有期徒刑".to_string(), ..Default::default() };
        let result = execute(&ctx, "盗窃罪", &extraction).await;
        assert_eq!(result.status, StageStatus::Success);
    }
}
