//! Catch-all for conditions that indicate a bug rather than an expected failure mode.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InternalError {
    #[error("invalid internal state: {0}")]
    InvalidState(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("internal error: {0}")]
    Other(String),
}
