//! Errors that are surfaced directly to the RPC caller (§6 error codes).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    /// Empty or overlong query (§8: 1..=500 chars).
    #[error("invalid query: {0}")]
    InvalidInput(String),

    /// Startup artifacts not loaded yet.
    #[error("service not ready: {0}")]
    NotReady(String),

    /// Request deadline exhausted before any fusion input was ready.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Stage 4 deadline hit but at least one strategy (basic_semantic) completed;
    /// the caller still gets a result, flagged `partial: true`.
    #[error("partial results: {reason}")]
    PartialResultsUnavailable { reason: String },
}
