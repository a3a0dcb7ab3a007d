#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// A persisted vector/BM25 artifact's shape does not match its declared header; fatal
    /// at startup, the service refuses to become ready (§7 "ArtifactCorruption").
    #[error("artifact corrupt in {component}: {reason}")]
    ArtifactCorruption { component: String, reason: String },

    #[error("artifact I/O error: {0}")]
    Io(String),
}

impl From<IndexError> for law_error::Error {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::ArtifactCorruption { component, reason } => {
                law_error::Error::Fatal(law_error::FatalError::ArtifactCorruption {
                    component,
                    reason,
                })
            }
            IndexError::Io(msg) => law_error::Error::Internal(law_error::InternalError::Other(msg)),
        }
    }
}
