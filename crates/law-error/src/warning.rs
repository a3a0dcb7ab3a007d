//! Non-fatal conditions the pipeline recovers from locally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WarningError {
    /// LLM network/timeout/rate-limit failure; caller falls back or retries.
    #[error("transient LLM failure: {0}")]
    TransientLlm(String),

    /// A single retrieval strategy aborted (error or timeout); excluded from fusion.
    #[error("strategy {strategy} failed: {reason}")]
    StrategyFailure { strategy: String, reason: String },

    /// LLM cache read/write fault; treated as a cache miss.
    #[error("cache fault: {0}")]
    CacheFault(String),

    /// Daily LLM budget reached; further LLM calls are skipped this request.
    #[error("LLM daily budget exhausted")]
    BudgetExhausted,
}
