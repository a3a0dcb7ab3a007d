//! Errors that leave the service unable to continue operating.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FatalError {
    /// Vector store / BM25 / KG shapes disagree at startup; the service refuses to become ready.
    #[error("artifact corruption in {component}: {reason}")]
    ArtifactCorruption { component: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind listener: {0}")]
    Bind(String),
}
