//! Retrieval Strategies (C8, §4.8). Each strategy is a free async function rather than
//! a trait object — the Router and the Orchestrator both work off the closed
//! [`law_core::Strategy`] enum, so there is no need for dynamic dispatch here (Design
//! Notes "Dynamic dispatch across strategies").
pub mod basic_semantic;
pub mod bm25_hybrid;
pub mod hyde_enhanced;
pub mod knowledge_graph;
pub mod llm_enhanced;
pub mod query2doc_enhanced;

use law_core::Strategy;

use crate::context::RetrievalContext;
use crate::types::{Extraction, StrategyResult};

pub const TOP_K_ARTICLES: usize = 20;
pub const TOP_K_CASES: usize = 20;

/// Dispatch a single selected strategy to its implementation (§4.8). Callers (the
/// Orchestrator) are responsible for the per-strategy timeout and for running these
/// concurrently; this function itself just executes one strategy to completion.
pub async fn execute(strategy: Strategy, ctx: &RetrievalContext, query: &str, extraction: &Extraction) -> StrategyResult {
    match strategy {
        Strategy::BasicSemantic => basic_semantic::execute(ctx, query).await,
        Strategy::Bm25Hybrid => bm25_hybrid::execute(ctx, query, extraction).await,
        Strategy::Query2docEnhanced => query2doc_enhanced::execute(ctx, query, extraction).await,
        Strategy::HydeEnhanced => hyde_enhanced::execute(ctx, extraction).await,
        Strategy::KnowledgeGraph => knowledge_graph::execute(ctx, query, extraction).await,
        Strategy::LlmEnhanced => llm_enhanced::execute(ctx, query).await,
    }
}
