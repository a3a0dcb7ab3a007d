#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("mapping table malformed: {0}")]
    MalformedMapping(String),
}

impl From<GraphError> for law_error::Error {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::MalformedMapping(reason) => {
                law_error::Error::Fatal(law_error::FatalError::ArtifactCorruption {
                    component: "knowledge_graph".to_string(),
                    reason,
                })
            }
        }
    }
}
