//! Search RPC request/response shapes (§6 "Search RPC").
use law_core::{QueryTrace, Strategy};
use serde::{Deserialize, Serialize};

pub const MAX_QUERY_CHARS: usize = 500;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k_articles: usize,
    #[serde(default = "default_top_k")]
    pub top_k_cases: usize,
    #[serde(default = "default_true")]
    pub enable_llm: bool,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_true() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), top_k_articles: DEFAULT_TOP_K, top_k_cases: DEFAULT_TOP_K, enable_llm: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResult {
    pub id: String,
    pub title: String,
    pub content_preview: String,
    pub score: f32,
    pub sources: Vec<Strategy>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub id: String,
    pub case_id: String,
    pub accusations: Vec<String>,
    pub content_preview: String,
    pub sentence_summary: String,
    pub score: f32,
    pub sources: Vec<Strategy>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub request_id: String,
    pub articles: Vec<ArticleResult>,
    pub cases: Vec<CaseResult>,
    pub final_answer: String,
    pub processing_time_ms: u64,
    /// `true` when Stage 4's global deadline expired but at least one strategy
    /// (at minimum `basic_semantic`) returned in time (§4.10, §8).
    #[serde(default)]
    pub partial: bool,
    pub trace: QueryTrace,
}

/// `sentence_summary` rendering for a case result (§6). Kept as a small free function
/// rather than a `Display` impl on `law_core::Sentence` so the wording stays an
/// orchestrator/RPC concern, not a data-model one.
pub fn summarize_sentence(sentence: &law_core::Sentence) -> String {
    if sentence.death_penalty {
        return "死刑".to_string();
    }
    if sentence.life {
        return "无期徒刑".to_string();
    }
    let mut parts = Vec::new();
    if sentence.months > 0 {
        parts.push(format!("有期徒刑{}个月", sentence.months));
    }
    if sentence.fine_amount > 0 {
        parts.push(format!("罚金{}元", sentence.fine_amount));
    }
    if parts.is_empty() {
        "无量刑记录".to_string()
    } else {
        parts.join("，")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadMoreRequest {
    pub query: String,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadMoreResponse {
    pub cases: Vec<CaseResult>,
    pub has_more: bool,
    pub returned_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn death_penalty_overrides_other_fields() {
        let s = law_core::Sentence { months: 120, fine_amount: 0, death_penalty: true, life: false };
        assert_eq!(summarize_sentence(&s), "死刑");
    }

    #[test]
    fn months_and_fine_join_with_comma() {
        let s = law_core::Sentence { months: 18, fine_amount: 5000, death_penalty: false, life: false };
        assert_eq!(summarize_sentence(&s), "有期徒刑18个月，罚金5000元");
    }
}
