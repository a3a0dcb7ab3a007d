use super::{Error, Severity};

/// A policy for classifying and emitting errors at a boundary (CLI, orchestrator).
/// Library crates return `Result<T>` and never emit directly; only the boundary decides.
pub trait ErrorPolicy: Send + Sync {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }
    fn emit(&self, error: &Error);
}

#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn emit(&self, _error: &Error) {}
}

#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn emit(&self, error: &Error) {
        match error.severity() {
            Severity::Warning => tracing::warn!(%error, "recovered error"),
            Severity::Error => tracing::error!(%error, "request error"),
            Severity::Fatal => tracing::error!(%error, "fatal error"),
        }
    }
}
