//! Router (C7, §4.7): selects the subset of strategies worth running and their weights.
use std::collections::HashMap;

use law_core::Strategy;

use crate::types::{Classification, Extraction, RoutingDecision};

/// Selected iff LLM confidence is at least this high (§4.7).
const LLM_ENHANCED_MIN_CONFIDENCE: f32 = 0.6;
/// Below this confidence, a non-criminal-law classification short-circuits to
/// `basic_semantic` only (§4.7).
const NOT_CRIMINAL_LAW_CONFIDENCE_FLOOR: f32 = 0.8;

pub async fn route(
    classification: &Classification,
    extraction: &Extraction,
    llm_healthy: bool,
) -> RoutingDecision {
    if !classification.is_criminal_law && classification.confidence >= NOT_CRIMINAL_LAW_CONFIDENCE_FLOOR {
        return single_strategy_decision(Strategy::BasicSemantic);
    }

    let mut selected = vec![Strategy::BasicSemantic];
    if !extraction.bm25_keywords.is_empty() {
        selected.push(Strategy::Bm25Hybrid);
    }
    if !extraction.query2doc_enhanced.is_empty() {
        selected.push(Strategy::Query2docEnhanced);
    }
    if !extraction.hyde_hypothetical.is_empty() {
        selected.push(Strategy::HydeEnhanced);
    }
    if !extraction.identified_crimes.is_empty() || !extraction.identified_articles.is_empty() {
        selected.push(Strategy::KnowledgeGraph);
    }
    if llm_healthy && classification.confidence >= LLM_ENHANCED_MIN_CONFIDENCE {
        selected.push(Strategy::LlmEnhanced);
    }

    RoutingDecision { weights: renormalized_weights(&selected), selected }
}

fn single_strategy_decision(strategy: Strategy) -> RoutingDecision {
    let mut weights = HashMap::new();
    weights.insert(strategy, 1.0);
    RoutingDecision { selected: vec![strategy], weights }
}

/// Default weights (0.25, 0.20, 0.20, 0.15, 0.15, 0.05) renormalized to sum to 1 over
/// the selected subset (§4.7).
fn renormalized_weights(selected: &[Strategy]) -> HashMap<Strategy, f32> {
    let total: f32 = selected.iter().map(|s| s.default_weight()).sum();
    if total <= f32::EPSILON {
        return selected.iter().map(|s| (*s, 1.0 / selected.len().max(1) as f32)).collect();
    }
    selected.iter().map(|s| (*s, s.default_weight() / total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bm25Keyword, IdentifiedCrime};

    fn classification(is_criminal_law: bool, confidence: f32) -> Classification {
        Classification { is_criminal_law, confidence, reasoning: String::new() }
    }

    #[tokio::test]
    async fn non_criminal_law_short_circuits_to_basic_semantic() {
        let decision = route(&classification(false, 0.9), &Extraction::default(), true).await;
        assert_eq!(decision.selected, vec![Strategy::BasicSemantic]);
        assert_eq!(decision.weights[&Strategy::BasicSemantic], 1.0);
    }

    #[tokio::test]
    async fn selects_bm25_hybrid_when_keywords_present() {
        let extraction = Extraction {
            bm25_keywords: vec![Bm25Keyword { keyword: "盗窃罪".into(), weight: 1.0 }],
            ..Default::default()
        };
        let decision = route(&classification(true, 0.9), &extraction, true).await;
        assert!(decision.selected.contains(&Strategy::Bm25Hybrid));
    }

    #[tokio::test]
    async fn selects_knowledge_graph_when_crime_detected() {
        let extraction = Extraction {
            identified_crimes: vec![IdentifiedCrime { name: "盗窃罪".into(), confidence: 0.9, reasoning: String::new() }],
            ..Default::default()
        };
        let decision = route(&classification(true, 0.9), &extraction, true).await;
        assert!(decision.selected.contains(&Strategy::KnowledgeGraph));
    }

    #[tokio::test]
    async fn selects_knowledge_graph_when_article_detected_without_crime() {
        let extraction = Extraction { identified_articles: vec![264], ..Default::default() };
        let decision = route(&classification(true, 0.9), &extraction, true).await;
        assert!(decision.selected.contains(&Strategy::KnowledgeGraph));
    }

    #[tokio::test]
    async fn skips_llm_enhanced_when_llm_unhealthy() {
        let decision = route(&classification(true, 0.95), &Extraction::default(), false).await;
        assert!(!decision.selected.contains(&Strategy::LlmEnhanced));
    }

    #[tokio::test]
    async fn skips_llm_enhanced_below_confidence_floor() {
        let decision = route(&classification(true, 0.5), &Extraction::default(), true).await;
        assert!(!decision.selected.contains(&Strategy::LlmEnhanced));
    }

    #[tokio::test]
    async fn weights_renormalize_to_one() {
        let extraction = Extraction {
            bm25_keywords: vec![Bm25Keyword { keyword: "k".into(), weight: 1.0 }],
            ..Default::default()
        };
        let decision = route(&classification(true, 0.95), &extraction, true).await;
        let sum: f32 = decision.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }
}
