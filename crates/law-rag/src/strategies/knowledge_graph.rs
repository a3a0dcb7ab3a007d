use law_core::{cosine_similarity, DocType, Strategy};
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::types::{Candidate, Extraction, StrategyResult};
use crate::understanding::detect_articles;

const ARTICLE_CANDIDATE_LIMIT: usize = 50;
const CASE_CANDIDATE_LIMIT: usize = 100;
const EDGE_WEIGHT: f32 = 0.7;
const SIMILARITY_WEIGHT: f32 = 0.3;

/// From detected entities, gather candidate articles (`related_articles`, limit 50) and
/// candidate cases (`cases_for` across the top pairs, limit 100); score each candidate
/// as `edge_confidence · 0.7 + cosine(query, doc) · 0.3` (§4.8).
pub async fn execute(ctx: &RetrievalContext, query: &str, extraction: &Extraction) -> StrategyResult {
    let crimes = extraction.crime_names();
    let articles_in_query = detect_articles(ctx, query);
    if crimes.is_empty() && articles_in_query.is_empty() {
        return StrategyResult::error(Strategy::KnowledgeGraph, "no crime or article entity detected");
    }
    let query_vec = match ctx.embedder.encode_one(query).await {
        Ok(v) => v,
        Err(e) => return StrategyResult::error(Strategy::KnowledgeGraph, e.to_string()),
    };

    let mut article_candidates = Vec::new();
    let mut case_pairs: Vec<(String, u32, f32)> = Vec::new();

    for crime in &crimes {
        for edge in ctx.graph.related_articles(crime, ARTICLE_CANDIDATE_LIMIT) {
            article_candidates.push((format!("article_{}", edge.article.number), edge.confidence));
            case_pairs.push((crime.clone(), edge.article.number, edge.confidence));
        }
    }

    let mut articles: Vec<Candidate> = article_candidates
        .into_iter()
        .map(|(doc_id, confidence)| {
            let sim = ctx
                .article_vectors
                .vector_for(&doc_id)
                .map(|v| cosine_similarity(&query_vec, v))
                .unwrap_or(0.0);
            Candidate {
                doc_id,
                score: (EDGE_WEIGHT * confidence + SIMILARITY_WEIGHT * sim).clamp(0.0, 1.0),
                debug: serde_json::json!({"edge_confidence": confidence, "cosine": sim}),
            }
        })
        .collect();
    articles.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.doc_id.cmp(&b.doc_id)));

    case_pairs.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    let mut cases: Vec<Candidate> = Vec::new();
    for (crime, article_number, confidence) in case_pairs.iter().take(ARTICLE_CANDIDATE_LIMIT) {
        for case_id in ctx.graph.cases_for(crime, *article_number, CASE_CANDIDATE_LIMIT) {
            let doc_id = format!("case_{case_id}");
            if cases.iter().any(|c: &Candidate| c.doc_id == doc_id) {
                continue;
            }
            let sim = ctx
                .case_vectors
                .vector_for(&doc_id)
                .map(|v| cosine_similarity(&query_vec, v))
                .unwrap_or(0.0);
            cases.push(Candidate {
                doc_id,
                score: (EDGE_WEIGHT * confidence + SIMILARITY_WEIGHT * sim).clamp(0.0, 1.0),
                debug: serde_json::json!({"edge_confidence": confidence, "cosine": sim}),
            });
            if cases.len() >= CASE_CANDIDATE_LIMIT {
                break;
            }
        }
    }
    cases.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.doc_id.cmp(&b.doc_id)));

    StrategyResult::ok(
        Strategy::KnowledgeGraph,
        articles,
        cases,
        serde_json::json!({"crimes": crimes, "articles_detected": articles_in_query}),
    )
}

/// Guard in case article doc ids ever stop matching the `article_<number>` convention
/// (§3's invariant that `type` is derivable from the id prefix).
#[allow(dead_code)]
fn assert_article_prefix_convention() {
    debug_assert!(matches!(DocType::from_id("article_1"), DocType::Article));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use crate::types::IdentifiedCrime;
    use law_core::StageStatus;

    #[tokio::test]
    async fn no_entities_yields_error_status() {
        let ctx = test_context().await;
        let result = execute(&ctx, "明天天气", &Extraction::default()).await;
        assert_eq!(result.status, StageStatus::Error);
    }

    #[tokio::test]
    async fn detected_crime_surfaces_related_article_and_case() {
        let ctx = test_context().await;
        let extraction = Extraction {
            identified_crimes: vec![IdentifiedCrime { name: "故意伤害罪".into(), confidence: 0.9, reasoning: String::new() }],
            ..Default::default()
        };
        let result = execute(&ctx, "故意伤害罪怎么判", &extraction).await;
        assert_eq!(result.status, StageStatus::Success);
        assert!(result.articles.iter().any(|c| c.doc_id == "article_234"));
        assert!(result.cases.iter().any(|c| c.doc_id == "case_2021_0001"));
    }
}
