//! law-rag — Query Understanding, Router, Retrieval Strategies, and Fusion Engine
//! (C6-C9, §4.6-§4.9). The Orchestrator (C10, in `law-orchestrator`) drives these in
//! sequence; this crate knows nothing about pipeline scheduling, deadlines, or events.
pub mod context;
pub mod error;
pub mod fusion;
pub mod normalize;
pub mod router;
pub mod strategies;
#[cfg(test)]
mod test_support;
pub mod types;
pub mod understanding;

pub use context::RetrievalContext;
pub use error::RagError;
pub use types::{
    Bm25Keyword, Candidate, Classification, Extraction, FusedCandidate, FusionOutput,
    IdentifiedCrime, RoutingDecision, StrategyResult,
};
