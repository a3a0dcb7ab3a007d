//! BM25 Index (C3, §4.3): Okapi BM25 over `title + content`, segmented by
//! [`tokenizer::ChineseTokenizer`]. One index per partition (articles, cases).
pub mod tokenizer;

use std::collections::HashSet;

use bm25::{EmbedderBuilder, Scorer};
use law_core::DocId;

pub use tokenizer::ChineseTokenizer;

/// Per-partition BM25 index. Built once at startup from the partition's
/// `searchable_text()` corpus (k1=1.2, b=0.75 — the crate's Okapi defaults).
pub struct Bm25Index {
    embedder: bm25::Embedder<u32, ChineseTokenizer>,
    scorer: Scorer<DocId, u32>,
    ids: HashSet<DocId>,
}

impl Bm25Index {
    /// Build from `(doc_id, searchable_text)` pairs, fitting `avgdl` to the corpus.
    pub fn build(docs: impl IntoIterator<Item = (DocId, String)>, stopwords: Vec<String>) -> Self {
        let tokenizer = ChineseTokenizer::with_stopwords(stopwords);
        let docs: Vec<(DocId, String)> = docs.into_iter().collect();

        let total_tokens: usize = docs
            .iter()
            .map(|(_, text)| tokenizer.tokenize_str(text).len())
            .sum();
        let avgdl = if docs.is_empty() {
            0.0
        } else {
            total_tokens as f32 / docs.len() as f32
        };

        let embedder = EmbedderBuilder::<u32, ChineseTokenizer>::with_avgdl(avgdl)
            .with_tokenizer(tokenizer)
            .build();
        let mut scorer = Scorer::<DocId, u32>::new();
        let mut ids = HashSet::with_capacity(docs.len());
        for (id, text) in &docs {
            scorer.upsert(id, embedder.embed(text));
            ids.insert(id.clone());
        }

        Self {
            embedder,
            scorer,
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &DocId) -> bool {
        self.ids.contains(id)
    }

    /// `search(terms, k)` → `(doc_id, bm25_score)` min-max normalized to [0, 1] (§4.3).
    /// An empty term list yields an empty result, not an error.
    pub fn search(&self, terms: &[String], k: usize) -> Vec<(DocId, f32)> {
        if terms.is_empty() {
            return Vec::new();
        }
        let query = terms.join(" ");
        let qemb = self.embedder.embed(&query);
        let mut matches = self.scorer.matches(&qemb);
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(k);

        let max = matches
            .iter()
            .map(|m| m.score)
            .fold(f32::MIN, f32::max);
        let min = matches
            .iter()
            .map(|m| m.score)
            .fold(f32::MAX, f32::min);
        let range = max - min;

        matches
            .into_iter()
            .map(|m| {
                let normalized = if range > f32::EPSILON {
                    (m.score - min) / range
                } else if matches_is_nonempty_single(&m.score) {
                    1.0
                } else {
                    0.0
                };
                (m.id, normalized)
            })
            .collect()
    }
}

fn matches_is_nonempty_single(score: &f32) -> bool {
    *score > 0.0
}
