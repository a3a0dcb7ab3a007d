#[derive(Debug, Clone, thiserror::Error)]
pub enum RagError {
    #[error("query understanding rejected the query: {0}")]
    InvalidQuery(String),

    #[error("strategy {strategy} failed: {reason}")]
    StrategyFailure { strategy: String, reason: String },

    #[error("no strategy produced a usable result")]
    NoUsableStrategy,
}

impl From<RagError> for law_error::Error {
    fn from(e: RagError) -> Self {
        match e {
            RagError::InvalidQuery(msg) => {
                law_error::Error::Request(law_error::RequestError::InvalidInput(msg))
            }
            RagError::StrategyFailure { strategy, reason } => {
                law_error::Error::Warning(law_error::WarningError::StrategyFailure { strategy, reason })
            }
            RagError::NoUsableStrategy => {
                law_error::Error::Request(law_error::RequestError::PartialResultsUnavailable {
                    reason: "no strategy produced a usable result".to_string(),
                })
            }
        }
    }
}
