use async_trait::async_trait;
use std::hash::{Hash, Hasher};

use crate::error::EmbedError;
use crate::provider::EmbeddingProvider;

/// Deterministic, model-free embedder used as the default dense backend and in tests.
///
/// Hashes overlapping character trigrams of the input into `dim` buckets, signed by a
/// second hash, then L2-normalizes. No weights to load, so it never fails at startup —
/// it exists to give the pipeline a dense path with no external dependency, not to be a
/// high-quality retriever.
#[derive(Debug, Clone)]
pub struct LocalHashEmbedder {
    dim: usize,
}

impl LocalHashEmbedder {
    pub const DEFAULT_DIM: usize = 256;

    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for LocalHashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

fn hash_u64(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

impl LocalHashEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return v;
        }
        let n = chars.len();
        let window = 3usize.min(n);
        for i in 0..n {
            let end = (i + window).min(n);
            let gram: String = chars[i..end].iter().collect();
            let bytes = gram.as_bytes();
            let bucket = (hash_u64(bytes) as usize) % self.dim;
            let sign = if hash_u64(&[bytes, b"#sign"].concat()) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            v[bucket] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for LocalHashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
