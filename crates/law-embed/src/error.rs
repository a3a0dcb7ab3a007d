#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbedError {
    /// The underlying model/backend cannot be reached. Fatal at startup, recoverable
    /// (the caller skips the dense path) mid-request (§4.1).
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("embedding request failed: {0}")]
    Request(String),
}

impl From<EmbedError> for law_error::Error {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::Unavailable(msg) => {
                law_error::Error::Warning(law_error::WarningError::TransientLlm(msg))
            }
            EmbedError::Request(msg) => {
                law_error::Error::Internal(law_error::InternalError::Other(msg))
            }
        }
    }
}
