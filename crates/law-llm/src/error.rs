use serde::{Deserialize, Serialize};

/// LLM client error taxonomy (§4.5, §7 "TransientLLM"). `is_transient` decides whether
/// the client retries/falls back or fails the call fast.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum LlmError {
    #[error("network request failed: {message}")]
    Request { message: String, is_timeout: bool },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication failed")]
    Authentication,

    #[error("request to the LLM provider timed out")]
    Timeout,

    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    #[error("daily LLM budget exhausted")]
    BudgetExhausted,

    #[error("no LLM provider is currently healthy")]
    Unavailable,
}

impl LlmError {
    /// Transient errors are worth retrying or falling back on; authentication/quota
    /// failures are not (§4.5 "non-transient ... fail fast").
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Request { .. } | LlmError::RateLimited | LlmError::Timeout
        )
    }
}

impl From<LlmError> for law_error::Error {
    fn from(e: LlmError) -> Self {
        law_error::Error::Warning(law_error::WarningError::TransientLlm(e.to_string()))
    }
}
