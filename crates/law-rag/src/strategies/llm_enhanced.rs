use std::collections::HashMap;

use law_core::{DocId, Strategy};
use law_embed::EmbeddingProvider;

use crate::context::RetrievalContext;
use crate::types::{Candidate, StrategyResult};

use super::{TOP_K_ARTICLES, TOP_K_CASES};

const MAX_REPHRASINGS: usize = 3;
const REPHRASE_PROMPT_TEMPLATE: &str = "你是一名中国刑法专家。请将以下问题改写为最多三种不同的法律检索措辞，\
每行一种，不要编号，不要多余说明：\n\n问题：{query}";

/// Ask the LLM for up to three additional legal phrasings of the query, encode each
/// alongside the original, and take the per-document max score across all phrasings
/// (§4.8). Unavailable LLM degrades to an error status rather than falling back to
/// plain semantic search, since that would just duplicate `basic_semantic`.
pub async fn execute(ctx: &RetrievalContext, query: &str) -> StrategyResult {
    if !ctx.llm.is_healthy().await {
        return StrategyResult::error(Strategy::LlmEnhanced, "llm unavailable");
    }

    let prompt = REPHRASE_PROMPT_TEMPLATE.replace("{query}", query);
    let rephrasings = match ctx.llm.generate(&prompt, 200, 0.7).await {
        Ok(text) => parse_rephrasings(&text),
        Err(e) => return StrategyResult::error(Strategy::LlmEnhanced, e.to_string()),
    };

    let mut phrasings = vec![query.to_string()];
    phrasings.extend(rephrasings);

    let mut article_max: HashMap<DocId, f32> = HashMap::new();
    let mut case_max: HashMap<DocId, f32> = HashMap::new();

    for phrasing in &phrasings {
        let query_vec = match ctx.embedder.encode_one(phrasing).await {
            Ok(v) => v,
            Err(_) => continue,
        };
        for (doc_id, score) in ctx.article_vectors.search(&query_vec, TOP_K_ARTICLES) {
            article_max.entry(doc_id).and_modify(|s| *s = s.max(score)).or_insert(score);
        }
        for (doc_id, score) in ctx.case_vectors.search(&query_vec, TOP_K_CASES) {
            case_max.entry(doc_id).and_modify(|s| *s = s.max(score)).or_insert(score);
        }
    }

    let articles = top_n(article_max, TOP_K_ARTICLES);
    let cases = top_n(case_max, TOP_K_CASES);

    StrategyResult::ok(
        Strategy::LlmEnhanced,
        articles,
        cases,
        serde_json::json!({"phrasing_count": phrasings.len()}),
    )
}

fn parse_rephrasings(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '、' || c == '-').trim())
        .filter(|l| !l.is_empty())
        .take(MAX_REPHRASINGS)
        .map(|s| s.to_string())
        .collect()
}

fn top_n(scores: HashMap<DocId, f32>, k: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = scores
        .into_iter()
        .map(|(doc_id, score)| Candidate { doc_id, score, debug: serde_json::json!({"metric": "cosine_max_over_phrasings"}) })
        .collect();
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    candidates.truncate(k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use law_core::StageStatus;

    #[tokio::test]
    async fn unhealthy_llm_yields_error_status() {
        let ctx = test_context().await;
        let result = execute(&ctx, "盗窃罪怎么判").await;
        assert_eq!(result.status, StageStatus::Error);
    }

    #[test]
    fn parse_rephrasings_strips_numbering_and_caps_at_three() {
        let text = "1. 盗窃罪量刑标准\n2、故意伤害罪如何处罚\n- 第二百六十四条规定\n第四种措辞应被丢弃";
        let out = parse_rephrasings(text);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], "盗窃罪量刑标准");
    }
}
