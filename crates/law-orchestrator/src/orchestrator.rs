//! Orchestrator & Tracer (C10, §4.10): drives Classification → Extraction → Routing →
//! Searches → Fusion in order, fans Stage 4 out as structured concurrency bound to one
//! deadline (Design Notes "Coroutine / async control flow"), and emits the event stream
//! as it goes.
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use law_core::{Document, QueryTrace, Stage, StageStatus, Strategy};
use law_error::{Error, RequestError};
use law_rag::types::{Extraction, RoutingDecision, StrategyResult};
use law_rag::{fusion, router, strategies, understanding};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::context::AppContext;
use crate::dto::{summarize_sentence, ArticleResult, CaseResult, SearchRequest, SearchResponse, MAX_QUERY_CHARS};
use crate::events::PipelineEvent;

const STAGE_CLASSIFICATION: u8 = 1;
const STAGE_EXTRACTION: u8 = 2;
const STAGE_ROUTING: u8 = 3;
const STAGE_SEARCHES: u8 = 4;
const STAGE_FUSION: u8 = 5;

fn validate_request(request: &SearchRequest) -> Result<(), Error> {
    // Count the trimmed length so a whitespace-only query (no real content to search
    // on) is rejected the same way an empty string is (§8 "Empty query").
    let len = request.query.trim().chars().count();
    if len == 0 || len > MAX_QUERY_CHARS {
        return Err(Error::Request(RequestError::InvalidInput(format!(
            "query length {len} out of range 1..={MAX_QUERY_CHARS}"
        ))));
    }
    Ok(())
}

fn emit_stage_started(ctx: &AppContext, request_id: &str, stage_number: u8, stage_name: &str) {
    ctx.events.publish(PipelineEvent::StageStarted {
        request_id: request_id.to_string(),
        stage_number,
        stage_name: stage_name.to_string(),
    });
}

fn emit_stage_completed(ctx: &AppContext, request_id: &str, stage_number: u8, stage_name: &str, processing_time_ms: u64, status: StageStatus) {
    ctx.events.publish(PipelineEvent::StageCompleted {
        request_id: request_id.to_string(),
        stage_number,
        stage_name: stage_name.to_string(),
        processing_time_ms,
        status: format!("{status:?}").to_lowercase(),
    });
}

/// Run the full five-stage pipeline for one request (§4.10). Returns `Err` only for the
/// fatal cases in §7: invalid input, the service not ready, or no fusion input ready at
/// all. Everything else degrades and comes back as a (possibly `partial: true`)
/// [`SearchResponse`].
pub async fn search(ctx: &AppContext, request: SearchRequest) -> Result<SearchResponse, Error> {
    validate_request(&request)?;
    if !ctx.state_ready() {
        return Err(Error::Request(RequestError::NotReady("artifacts not loaded".to_string())));
    }

    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();
    let mut trace = QueryTrace::new(request_id.clone(), request.query.clone(), Utc::now());

    // Stage 1: Classification.
    emit_stage_started(ctx, &request_id, STAGE_CLASSIFICATION, "classification");
    let stage_start = Instant::now();
    trace.classification.start(serde_json::json!({"query": request.query, "enable_llm": request.enable_llm}));
    let classification = if request.enable_llm {
        understanding::classify(&ctx.retrieval, &request.query).await
    } else {
        understanding::classify_offline(&ctx.retrieval, &request.query)
    };
    let elapsed = stage_start.elapsed().as_millis() as u64;
    trace.classification.succeed(serde_json::to_value(&classification).unwrap_or_default(), elapsed);
    emit_stage_completed(ctx, &request_id, STAGE_CLASSIFICATION, "classification", elapsed, StageStatus::Success);

    // Stage 2: Extraction.
    emit_stage_started(ctx, &request_id, STAGE_EXTRACTION, "extraction");
    let stage_start = Instant::now();
    trace.extraction.start(serde_json::json!({"query": request.query}));
    let extraction: Extraction = if request.enable_llm {
        understanding::extract(&ctx.retrieval, &request.query).await
    } else {
        understanding::extract_offline(&ctx.retrieval, &request.query).await
    };
    let elapsed = stage_start.elapsed().as_millis() as u64;
    trace.extraction.succeed(serde_json::to_value(&extraction).unwrap_or_default(), elapsed);
    emit_stage_completed(ctx, &request_id, STAGE_EXTRACTION, "extraction", elapsed, StageStatus::Success);

    // Stage 3: Routing.
    emit_stage_started(ctx, &request_id, STAGE_ROUTING, "routing");
    let stage_start = Instant::now();
    trace.routing.start(serde_json::json!({"is_criminal_law": classification.is_criminal_law}));
    let llm_healthy = request.enable_llm && ctx.retrieval.llm.is_healthy().await;
    let routing: RoutingDecision = router::route(&classification, &extraction, llm_healthy).await;
    let elapsed = stage_start.elapsed().as_millis() as u64;
    trace.routing.succeed(serde_json::to_value(&routing).unwrap_or_default(), elapsed);
    emit_stage_completed(ctx, &request_id, STAGE_ROUTING, "routing", elapsed, StageStatus::Success);

    // The trace must contain exactly the strategies the Router selected (§3 invariant),
    // seeded as `pending` before Stage 4 runs any of them.
    for strategy in &routing.selected {
        trace.searches.entry(*strategy).or_default();
    }

    // Stage 4: Searches, fanned out under one deadline.
    emit_stage_started(ctx, &request_id, STAGE_SEARCHES, "searches");
    let stage_start = Instant::now();
    let (results, deadline_hit) = run_searches(ctx, &request_id, &request.query, &extraction, &routing, &mut trace).await;
    let elapsed = stage_start.elapsed().as_millis() as u64;
    let success_count = results.iter().filter(|r| r.status == StageStatus::Success).count();
    emit_stage_completed(
        ctx,
        &request_id,
        STAGE_SEARCHES,
        "searches",
        elapsed,
        if success_count > 0 { StageStatus::Success } else { StageStatus::Error },
    );

    if success_count == 0 {
        return Err(if deadline_hit {
            Error::Request(RequestError::DeadlineExceeded)
        } else {
            Error::Request(RequestError::PartialResultsUnavailable {
                reason: "no retrieval strategy succeeded".to_string(),
            })
        });
    }

    // Stage 5: Fusion.
    emit_stage_started(ctx, &request_id, STAGE_FUSION, "fusion");
    let stage_start = Instant::now();
    trace.fusion.start(serde_json::json!({"contributing_strategies": success_count}));
    let fusion_output = fusion::fuse(&ctx.retrieval, &request.query, &results, &routing.weights, routing.selected.len(), llm_healthy).await;
    let elapsed = stage_start.elapsed().as_millis() as u64;
    trace.fusion.succeed(
        serde_json::json!({"articles": fusion_output.articles.len(), "cases": fusion_output.cases.len()}),
        elapsed,
    );
    emit_stage_completed(ctx, &request_id, STAGE_FUSION, "fusion", elapsed, StageStatus::Success);

    ctx.pagination.put(&request.query, fusion_output.cases.clone()).await;

    let articles: Vec<ArticleResult> = fusion_output
        .articles
        .iter()
        .take(request.top_k_articles)
        .filter_map(|f| {
            let doc = ctx.retrieval.document(&f.doc_id)?;
            Some(ArticleResult {
                id: f.doc_id.clone(),
                title: doc.title().to_string(),
                content_preview: doc.content_preview(300),
                score: f.score,
                sources: f.sources.clone(),
                confidence: f.confidence,
            })
        })
        .collect();

    let cases: Vec<CaseResult> = fusion_output
        .cases
        .iter()
        .take(request.top_k_cases)
        .filter_map(|f| {
            let doc = ctx.retrieval.document(&f.doc_id)?;
            match doc {
                Document::Case { case_id, accusations, sentence, .. } => Some(CaseResult {
                    id: f.doc_id.clone(),
                    case_id: case_id.clone(),
                    accusations: accusations.iter().cloned().collect(),
                    content_preview: doc.content_preview(300),
                    sentence_summary: summarize_sentence(sentence),
                    score: f.score,
                    sources: f.sources.clone(),
                    confidence: f.confidence,
                }),
                Document::Article { .. } => None,
            }
        })
        .collect();

    let processing_time_ms = start.elapsed().as_millis() as u64;
    ctx.events.publish(PipelineEvent::SearchCompleted {
        request_id: request_id.clone(),
        total_time_ms: processing_time_ms,
        final_result_summary: format!("{} articles, {} cases", articles.len(), cases.len()),
    });

    Ok(SearchResponse {
        request_id,
        articles,
        cases,
        final_answer: fusion_output.final_answer,
        processing_time_ms,
        partial: deadline_hit,
        trace,
    })
}

/// Fan the Router's selected strategies out as one task each, capped at
/// `config.concurrency_cap` concurrent tasks, bound to one shared deadline (§4.10, §5,
/// §9 "structured concurrency"). Tasks still running when the deadline fires are
/// aborted and recorded as `status=error, error_message="timeout"`; Fusion still runs on
/// whatever did complete.
async fn run_searches(
    ctx: &AppContext,
    request_id: &str,
    query: &str,
    extraction: &Extraction,
    routing: &RoutingDecision,
    trace: &mut QueryTrace,
) -> (Vec<StrategyResult>, bool) {
    let semaphore = Arc::new(Semaphore::new(ctx.config.concurrency_cap.max(1)));
    let mut join_set: JoinSet<(Strategy, StrategyResult, u64)> = JoinSet::new();

    for strategy in routing.selected.iter().copied() {
        let sem = semaphore.clone();
        let retrieval = ctx.retrieval.clone();
        let query = query.to_string();
        let extraction = extraction.clone();
        let events = ctx.events.clone();
        let request_id = request_id.to_string();
        let strategy_timeout = ctx.config.strategy_timeout;

        join_set.spawn(async move {
            let _permit = sem.acquire_owned().await;
            events.publish(PipelineEvent::ModuleStarted { request_id: request_id.clone(), module_name: strategy.to_string() });

            let task_start = Instant::now();
            let outcome = tokio::time::timeout(strategy_timeout, strategies::execute(strategy, &retrieval, &query, &extraction)).await;
            let elapsed = task_start.elapsed().as_millis() as u64;
            let result = outcome.unwrap_or_else(|_| StrategyResult::error(strategy, "timeout"));

            events.publish(PipelineEvent::ModuleCompleted {
                request_id,
                module_name: strategy.to_string(),
                status: format!("{:?}", result.status).to_lowercase(),
                processing_time_ms: elapsed,
                results_count: result.articles.len() + result.cases.len(),
                error_message: error_message_of(&result),
            });

            (strategy, result, elapsed)
        });
    }

    let mut results = Vec::new();
    let mut deadline_hit = false;
    let deadline = tokio::time::sleep(ctx.config.stage4_deadline);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            biased;
            _ = &mut deadline => {
                deadline_hit = true;
                break;
            }
            joined = join_set.join_next() => {
                match joined {
                    Some(Ok((strategy, result, elapsed))) => {
                        let stage = trace.searches.entry(strategy).or_default();
                        match result.status {
                            StageStatus::Success => stage.succeed(
                                serde_json::json!({"articles": result.articles.len(), "cases": result.cases.len()}),
                                elapsed,
                            ),
                            _ => stage.fail(error_message_of(&result).unwrap_or_else(|| "strategy failed".to_string()), elapsed),
                        }
                        results.push(result);
                    }
                    Some(Err(_join_error)) => {
                        // A task panicked; treated as a strategy failure (§7 `StrategyFailure`),
                        // not fatal to the request.
                    }
                    None => break,
                }
            }
        }
    }

    if deadline_hit {
        join_set.abort_all();
        for strategy in routing.selected.iter().copied() {
            if !results.iter().any(|r| r.strategy == strategy) {
                let stage = trace.searches.entry(strategy).or_default();
                stage.fail("timeout".to_string(), ctx.config.stage4_deadline.as_millis() as u64);
                results.push(StrategyResult::error(strategy, "timeout"));
            }
        }
    }

    (results, deadline_hit)
}

fn error_message_of(result: &StrategyResult) -> Option<String> {
    if result.status == StageStatus::Error {
        Some(result.search_meta.as_str().map(str::to_string).unwrap_or_else(|| result.search_meta.to_string()))
    } else {
        None
    }
}
