//! Shared DTOs passed between Query Understanding (C6), the Router (C7), the six
//! retrieval strategies (C8), and the Fusion Engine (C9).
use std::collections::HashMap;

use law_core::{DocId, StageStatus, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub is_criminal_law: bool,
    pub confidence: f32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifiedCrime {
    pub name: String,
    pub confidence: f32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Keyword {
    pub keyword: String,
    pub weight: f32,
}

/// Output of C6's Extraction sub-operation (§4.6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub identified_crimes: Vec<IdentifiedCrime>,
    pub identified_articles: Vec<u32>,
    pub bm25_keywords: Vec<Bm25Keyword>,
    pub query2doc_enhanced: String,
    pub hyde_hypothetical: String,
}

impl Extraction {
    pub fn crime_names(&self) -> Vec<String> {
        self.identified_crimes.iter().map(|c| c.name.clone()).collect()
    }
}

/// A single scored candidate with the debug payload strategies are expected to attach
/// (§4.8 "articles: ranked [doc_id, score, debug]").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub doc_id: DocId,
    pub score: f32,
    #[serde(default)]
    pub debug: Value,
}

/// A strategy's output for one request (§4.8). `status = Error` with empty lists means
/// the strategy could not run; the Orchestrator excludes it from fusion but does not
/// abort the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub status: StageStatus,
    pub articles: Vec<Candidate>,
    pub cases: Vec<Candidate>,
    pub search_meta: Value,
}

impl StrategyResult {
    pub fn ok(strategy: Strategy, articles: Vec<Candidate>, cases: Vec<Candidate>, search_meta: Value) -> Self {
        Self { strategy, status: StageStatus::Success, articles, cases, search_meta }
    }

    pub fn error(strategy: Strategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            status: StageStatus::Error,
            articles: Vec::new(),
            cases: Vec::new(),
            search_meta: Value::String(reason.into()),
        }
    }
}

/// Router output: the selected strategies and their (renormalized) weights (§4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub selected: Vec<Strategy>,
    pub weights: HashMap<Strategy, f32>,
}

/// One fused candidate in the final ranking (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedCandidate {
    pub doc_id: DocId,
    pub score: f32,
    pub sources: Vec<Strategy>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusionOutput {
    pub articles: Vec<FusedCandidate>,
    pub cases: Vec<FusedCandidate>,
    pub final_answer: String,
}
