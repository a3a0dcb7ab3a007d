use std::collections::HashSet;

use law_core::{cosine_similarity, DocId};

/// One partition of the vector store: a dense matrix plus the parallel id list that
/// gives each row its document identity (§4.2). `articles` and `cases` each get one.
#[derive(Debug, Default, Clone)]
pub struct Partition {
    ids: Vec<DocId>,
    vectors: Vec<Vec<f32>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            ids: Vec::with_capacity(cap),
            vectors: Vec::with_capacity(cap),
        }
    }

    pub fn push(&mut self, id: DocId, vector: Vec<f32>) {
        self.ids.push(id);
        self.vectors.push(vector);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }

    /// The stored vector for `id`, if present. Used by strategies that need to score a
    /// specific candidate directly rather than running a full top-k search (§4.8
    /// "knowledge_graph").
    pub fn vector_for(&self, id: &DocId) -> Option<&[f32]> {
        self.ids.iter().position(|x| x == id).map(|i| self.vectors[i].as_slice())
    }

    /// `search(query_vec, k)` → ordered `(doc_id, score)` (§4.2). Ties broken by higher
    /// score first, then doc_id ascending.
    pub fn search(&self, query_vec: &[f32], k: usize) -> Vec<(DocId, f32)> {
        self.search_with_ids(query_vec, k, None)
    }

    /// `search_with_ids` restricted to `id_filter` when present (KG-prefiltered search,
    /// §4.2). An empty (but present) filter yields an empty list, not an error.
    pub fn search_with_ids(
        &self,
        query_vec: &[f32],
        k: usize,
        id_filter: Option<&HashSet<DocId>>,
    ) -> Vec<(DocId, f32)> {
        if let Some(filter) = id_filter {
            if filter.is_empty() {
                return Vec::new();
            }
        }

        let mut scored: Vec<(DocId, f32)> = self
            .ids
            .iter()
            .zip(self.vectors.iter())
            .filter(|(id, _)| id_filter.map_or(true, |f| f.contains(*id)))
            .map(|(id, v)| (id.clone(), cosine_similarity(query_vec, v)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}
