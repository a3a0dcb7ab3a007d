use std::collections::HashMap;

use law_core::{DocId, Strategy};
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::normalize::minmax;
use crate::types::{Candidate, Extraction, StrategyResult};

use super::{TOP_K_ARTICLES, TOP_K_CASES};

const DENSE_WEIGHT: f32 = 0.6;
const BM25_WEIGHT: f32 = 0.4;

/// Run C3 on the BM25 keywords AND C2 on the original query; combine per-document as
/// `0.6·dense + 0.4·bm25` after per-source normalization (§4.8).
pub async fn execute(ctx: &RetrievalContext, query: &str, extraction: &Extraction) -> StrategyResult {
    let query_vec = match ctx.embedder.encode_one(query).await {
        Ok(v) => v,
        Err(e) => return StrategyResult::error(Strategy::Bm25Hybrid, e.to_string()),
    };
    let terms: Vec<String> = extraction.bm25_keywords.iter().map(|k| k.keyword.clone()).collect();

    let articles = combine(
        &ctx.article_vectors.search(&query_vec, TOP_K_ARTICLES),
        &ctx.article_bm25.search(&terms, TOP_K_ARTICLES),
        TOP_K_ARTICLES,
    );
    let cases = combine(
        &ctx.case_vectors.search(&query_vec, TOP_K_CASES),
        &ctx.case_bm25.search(&terms, TOP_K_CASES),
        TOP_K_CASES,
    );

    StrategyResult::ok(Strategy::Bm25Hybrid, articles, cases, serde_json::json!({"terms": terms}))
}

fn combine(dense: &[(DocId, f32)], bm25: &[(DocId, f32)], k: usize) -> Vec<Candidate> {
    let dense_norm = minmax(dense);
    let bm25_norm = minmax(bm25);

    let mut combined: HashMap<DocId, (f32, f32)> = HashMap::new();
    for (id, score) in dense_norm {
        combined.entry(id).or_insert((0.0, 0.0)).0 = score;
    }
    for (id, score) in bm25_norm {
        combined.entry(id).or_insert((0.0, 0.0)).1 = score;
    }

    let mut scored: Vec<Candidate> = combined
        .into_iter()
        .map(|(doc_id, (dense_score, bm25_score))| Candidate {
            doc_id,
            score: DENSE_WEIGHT * dense_score + BM25_WEIGHT * bm25_score,
            debug: serde_json::json!({"dense": dense_score, "bm25": bm25_score}),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use crate::types::Bm25Keyword;
    use law_core::StageStatus;

    #[tokio::test]
    async fn combines_dense_and_bm25_with_expected_weighting() {
        let ctx = test_context().await;
        let extraction = Extraction {
            bm25_keywords: vec![Bm25Keyword { keyword: "盗窃罪".into(), weight: 1.0 }],
            ..Default::default()
        };
        let result = execute(&ctx, "盗窃罪量刑标准", &extraction).await;
        assert_eq!(result.status, StageStatus::Success);
        assert!(!result.articles.is_empty());
    }

    #[test]
    fn combine_scores_within_unit_interval() {
        let dense = vec![("a".to_string(), 0.9), ("b".to_string(), 0.1)];
        let bm25 = vec![("a".to_string(), 0.2), ("c".to_string(), 0.8)];
        let out = combine(&dense, &bm25, 10);
        for c in &out {
            assert!(c.score >= 0.0 && c.score <= 1.0);
        }
    }
}
