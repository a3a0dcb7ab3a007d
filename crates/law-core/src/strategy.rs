//! The finite set of retrieval strategies (§4.8, Design Notes "Dynamic dispatch across
//! strategies"). Modeled as a closed enum rather than trait objects so the Router, the
//! strategy registry, and the trace's `searches` map all agree on the same key space.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    BasicSemantic,
    Bm25Hybrid,
    Query2docEnhanced,
    HydeEnhanced,
    KnowledgeGraph,
    LlmEnhanced,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::BasicSemantic,
        Strategy::Bm25Hybrid,
        Strategy::Query2docEnhanced,
        Strategy::HydeEnhanced,
        Strategy::KnowledgeGraph,
        Strategy::LlmEnhanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BasicSemantic => "basic_semantic",
            Strategy::Bm25Hybrid => "bm25_hybrid",
            Strategy::Query2docEnhanced => "query2doc_enhanced",
            Strategy::HydeEnhanced => "hyde_enhanced",
            Strategy::KnowledgeGraph => "knowledge_graph",
            Strategy::LlmEnhanced => "llm_enhanced",
        }
    }

    /// Default fusion weight before renormalization (§4.7).
    pub fn default_weight(&self) -> f32 {
        match self {
            Strategy::BasicSemantic => 0.25,
            Strategy::Bm25Hybrid => 0.20,
            Strategy::Query2docEnhanced => 0.20,
            Strategy::HydeEnhanced => 0.15,
            Strategy::KnowledgeGraph => 0.15,
            Strategy::LlmEnhanced => 0.05,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
