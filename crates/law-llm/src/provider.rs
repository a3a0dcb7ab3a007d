use async_trait::async_trait;

use crate::error::LlmError;

/// Raw text-generation capability (§4.5). Implementations are the thing that actually
/// talks to a model; retry/timeout/cache/budget/fallback live one layer up in
/// [`crate::client::LlmClient`].
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, LlmError>;
}
