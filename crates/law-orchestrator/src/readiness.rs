//! Startup readiness gate (§3 "Lifecycle", §7 `NotReady`/`ArtifactCorruption`).
//!
//! The service must refuse to become ready when the vector store and
//! BM25 index disagree on their id-set sizes at startup; this models that refusal as an
//! explicit state rather than a boolean so `law-cli health` has something concrete to
//! report.
use law_index::{Bm25Index, Partition};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceState {
    Loading,
    Ready,
    Failed { reason: String },
}

impl ServiceState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ServiceState::Ready)
    }
}

/// Cross-check one partition's vector store against its BM25 index (§3 invariant:
/// "Vector store and BM25 index cover the same ID set; sizes must match at startup").
pub fn check_partition(name: &str, vectors: &Partition, bm25: &Bm25Index) -> Result<(), String> {
    if vectors.len() != bm25.len() {
        return Err(format!(
            "{name}: vector store has {} documents but bm25 index has {}",
            vectors.len(),
            bm25.len()
        ));
    }
    for id in vectors.ids() {
        if !bm25.contains(id) {
            return Err(format!("{name}: document {id} is indexed in the vector store but not in bm25"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_partitions_pass() {
        let mut v = Partition::new();
        v.push("article_1".to_string(), vec![1.0, 0.0]);
        let bm25 = Bm25Index::build(vec![("article_1".to_string(), "text".to_string())], vec![]);
        assert!(check_partition("articles", &v, &bm25).is_ok());
    }

    #[test]
    fn size_mismatch_fails() {
        let mut v = Partition::new();
        v.push("article_1".to_string(), vec![1.0, 0.0]);
        v.push("article_2".to_string(), vec![0.0, 1.0]);
        let bm25 = Bm25Index::build(vec![("article_1".to_string(), "text".to_string())], vec![]);
        assert!(check_partition("articles", &v, &bm25).is_err());
    }
}
