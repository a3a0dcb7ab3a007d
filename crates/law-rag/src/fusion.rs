//! Fusion Engine (C9, §4.9): weighted Reciprocal Rank Fusion across the strategy
//! outputs that survived Stage 4, followed by a grounding-bundle call to C5 for the
//! final answer. Generalizes the two-source RRF the teacher built for BM25+dense into
//! an N-strategy, `DocId`-keyed fusion.
use std::collections::HashMap;

use law_core::{DocId, Strategy};

use crate::context::RetrievalContext;
use crate::normalize::minmax;
use crate::types::{Candidate, FusedCandidate, FusionOutput, StrategyResult};

const RRF_K: f32 = 60.0;
const SCORE_BLEND_LAMBDA: f32 = 0.3;
const TOP_N: usize = 10;
const GROUNDING_DOC_COUNT: usize = 5;

struct Accumulator {
    rrf_score: f32,
    normalized_sum: f32,
    sources: Vec<Strategy>,
}

/// Weighted RRF: `Σ w_s / (rank_s(doc) + 60) + λ · avg_normalized_score(doc)`, λ = 0.3
/// (§4.9). `results` pairs each successful strategy's output with its router weight.
fn fuse_side(
    results: &[(Strategy, f32, &[Candidate])],
    total_selected: usize,
) -> Vec<FusedCandidate> {
    let mut acc: HashMap<DocId, Accumulator> = HashMap::new();

    for (strategy, weight, candidates) in results {
        let normalized = minmax(&candidates.iter().map(|c| (c.doc_id.clone(), c.score)).collect::<Vec<_>>());
        for (rank, (doc_id, norm_score)) in normalized.into_iter().enumerate() {
            let entry = acc.entry(doc_id).or_insert(Accumulator {
                rrf_score: 0.0,
                normalized_sum: 0.0,
                sources: Vec::new(),
            });
            entry.rrf_score += weight / (RRF_K + (rank as f32 + 1.0));
            entry.normalized_sum += norm_score;
            entry.sources.push(*strategy);
        }
    }

    let mut scored: Vec<(FusedCandidate, f32)> = acc
        .into_iter()
        .map(|(doc_id, a)| {
            let avg_normalized = a.normalized_sum / a.sources.len().max(1) as f32;
            (
                FusedCandidate {
                    doc_id,
                    score: a.rrf_score + SCORE_BLEND_LAMBDA * avg_normalized,
                    confidence: (a.sources.len() as f32 / total_selected.max(1) as f32).min(1.0),
                    sources: a.sources,
                },
                avg_normalized,
            )
        })
        .collect();

    // Ranked by fusion_score desc (§4.9). Ties break by (a) contributing strategies
    // desc, (b) average normalized score desc, (c) doc_id asc.
    scored.sort_by(|(a, a_norm), (b, b_norm)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.sources.len().cmp(&a.sources.len()))
            .then_with(|| b_norm.partial_cmp(a_norm).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    let mut fused: Vec<FusedCandidate> = scored.into_iter().map(|(f, _)| f).collect();
    fused.truncate(TOP_N);
    fused
}

/// Fuse all successful strategy results into a final ranking, then call C5 with a
/// grounding bundle to produce `final_answer` (§4.9).
pub async fn fuse(
    ctx: &RetrievalContext,
    query: &str,
    results: &[StrategyResult],
    weights: &HashMap<Strategy, f32>,
    total_selected: usize,
    llm_enabled: bool,
) -> FusionOutput {
    let successes: Vec<&StrategyResult> = results
        .iter()
        .filter(|r| r.status == law_core::StageStatus::Success)
        .collect();

    let article_inputs: Vec<(Strategy, f32, &[Candidate])> = successes
        .iter()
        .map(|r| (r.strategy, *weights.get(&r.strategy).unwrap_or(&1.0), r.articles.as_slice()))
        .collect();
    let case_inputs: Vec<(Strategy, f32, &[Candidate])> = successes
        .iter()
        .map(|r| (r.strategy, *weights.get(&r.strategy).unwrap_or(&1.0), r.cases.as_slice()))
        .collect();

    let articles = fuse_side(&article_inputs, total_selected);
    let cases = fuse_side(&case_inputs, total_selected);

    let final_answer = build_final_answer(ctx, query, &articles, &cases, llm_enabled).await;

    FusionOutput { articles, cases, final_answer }
}

async fn build_final_answer(
    ctx: &RetrievalContext,
    query: &str,
    articles: &[FusedCandidate],
    cases: &[FusedCandidate],
    llm_enabled: bool,
) -> String {
    if !llm_enabled || !ctx.llm.is_healthy().await {
        return deterministic_template(ctx, articles);
    }

    let grounding = grounding_bundle(ctx, articles, cases);
    if grounding.is_empty() {
        return deterministic_template(ctx, articles);
    }

    let prompt = format!(
        "你是一名中国刑法专家。请依据以下法条与判例内容，针对用户问题给出简明的中文回答，\
         只使用给定材料中的信息：\n\n材料：\n{grounding}\n\n问题：{query}"
    );
    match ctx.llm.generate(&prompt, 400, 0.2).await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => deterministic_template(ctx, articles),
    }
}

fn grounding_bundle(ctx: &RetrievalContext, articles: &[FusedCandidate], cases: &[FusedCandidate]) -> String {
    let mut parts = Vec::new();
    for a in articles.iter().take(GROUNDING_DOC_COUNT) {
        if let Some(doc) = ctx.document(&a.doc_id) {
            parts.push(format!("[{}] {}：{}", a.doc_id, doc.title(), doc.content_preview(300)));
        }
    }
    for c in cases.iter().take(GROUNDING_DOC_COUNT) {
        if let Some(doc) = ctx.document(&c.doc_id) {
            parts.push(format!("[{}] {}：{}", c.doc_id, doc.title(), doc.content_preview(300)));
        }
    }
    parts.join("\n")
}

/// Deterministic fallback built from the top article's content when C5 is unavailable
/// or returns nothing usable (§4.9).
fn deterministic_template(ctx: &RetrievalContext, articles: &[FusedCandidate]) -> String {
    match articles.first().and_then(|top| ctx.document(&top.doc_id)) {
        Some(doc) => format!("根据{}：{}", doc.title(), doc.content_preview(300)),
        None => "未能检索到相关法条或判例。".to_string(),
    }
}
