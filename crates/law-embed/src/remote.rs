use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbedError;
use crate::provider::EmbeddingProvider;

/// OpenAI-compatible `/v1/embeddings` backend (§4.1's "underlying model" may be remote).
/// Mirrors the request/response shape of the batch embedding APIs this pipeline's
/// providers expose: one model name, a batch of inputs, one vector per input in order.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dim: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbedDatum {
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>, dim: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dim,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let req = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbedError::Request(format!(
                "embedding backend returned {status}: {body}"
            )));
        }

        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| EmbedError::Request(format!("malformed embedding response: {e}")))?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
