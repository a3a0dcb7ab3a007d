//! Crime ↔ article knowledge-graph DTOs (§3 "KG Nodes"). The graph algorithms that
//! operate on these live in `law-graph`; this crate only owns the shared shapes so that
//! `law-rag` and `law-orchestrator` can reference them without depending on the graph
//! crate's internals.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Crime {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Article {
    pub number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeArticleEdge {
    pub crime: Crime,
    pub article: Article,
    pub case_count: u32,
    pub confidence: f32,
    pub rare_crime: bool,
}

/// A keyword expanded from KG neighbors, weighted by edge confidence (§4.4 `expand`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: f32,
}
