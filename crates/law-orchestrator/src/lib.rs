//! law-orchestrator — Orchestrator & Tracer (C10, §4.10): the process-wide `AppContext`,
//! the five-stage pipeline driver, the real-time event stream, the startup readiness
//! gate, and the "load more cases" pagination cache. Everything else (C1-C9) is wired
//! together here but implemented in its own crate.
pub mod context;
pub mod dto;
pub mod events;
pub mod orchestrator;
pub mod pagination;
pub mod readiness;
#[cfg(test)]
mod test_support;

pub use context::{AppContext, OrchestratorConfig};
pub use dto::{ArticleResult, CaseResult, LoadMoreRequest, LoadMoreResponse, SearchRequest, SearchResponse};
pub use events::{EventBus, PipelineEvent};
pub use orchestrator::search;
pub use readiness::ServiceState;

/// "Load more cases" (§6): serve the next page from the pagination cache rather than
/// re-running the pipeline. Returns `None` if the query has no cached case list or the
/// entry expired (§4.10 "Supplemented features").
pub async fn load_more_cases(ctx: &AppContext, request: dto::LoadMoreRequest) -> Option<LoadMoreResponse> {
    let (cases, has_more, returned_count) = ctx.pagination.page(&request.query, request.offset, request.limit).await?;
    let cases = cases
        .iter()
        .filter_map(|fused| {
            let doc = ctx.retrieval.document(&fused.doc_id)?;
            match doc {
                law_core::Document::Case { case_id, accusations, sentence, .. } => Some(CaseResult {
                    id: fused.doc_id.clone(),
                    case_id: case_id.clone(),
                    accusations: accusations.iter().cloned().collect(),
                    content_preview: doc.content_preview(300),
                    sentence_summary: dto::summarize_sentence(sentence),
                    score: fused.score,
                    sources: fused.sources.clone(),
                    confidence: fused.confidence,
                }),
                law_core::Document::Article { .. } => None,
            }
        })
        .collect();
    Some(LoadMoreResponse { cases, has_more, returned_count })
}
