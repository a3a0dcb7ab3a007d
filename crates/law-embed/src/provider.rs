use async_trait::async_trait;

use crate::error::EmbedError;

/// Encode text into fixed-dimension dense vectors (§4.1). Implementations must be
/// deterministic up to floating-point noise for identical inputs and must agree on `D`
/// with whatever partition they are queried against in `law-index`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// The dimensionality this provider emits.
    fn dim(&self) -> usize;

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    async fn encode_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut out = self.encode(&[text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| EmbedError::Request("empty encode response".to_string()))
    }
}
