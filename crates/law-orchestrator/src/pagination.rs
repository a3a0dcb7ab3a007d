//! Load-more-cases pagination cache (§6 "Load-more cases").
//!
//! `{query, offset, limit}` pagination must reuse the cached fused case list keyed by
//! `query` within a short TTL instead of rerunning the pipeline. The TTL is an Open
//! Question in §9; `DESIGN.md` records the 5-minute default kept here.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use law_rag::FusedCandidate;
use tokio::sync::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const MAX_LOAD_MORE_LIMIT: usize = 10;

struct Entry {
    cases: Vec<FusedCandidate>,
    inserted_at: Instant,
}

/// Normalizes query text the same way for both storage and lookup: trims and collapses
/// internal whitespace so `"故意伤害 "`/`"故意伤害"` hit the same cache slot.
fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct PaginationCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl PaginationCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub async fn put(&self, query: &str, cases: Vec<FusedCandidate>) {
        let mut entries = self.entries.lock().await;
        entries.insert(normalize(query), Entry { cases, inserted_at: Instant::now() });
    }

    /// Returns `(page, has_more, returned_count)` for a non-expired entry, or `None` if
    /// the pipeline must be rerun.
    pub async fn page(&self, query: &str, offset: usize, limit: usize) -> Option<(Vec<FusedCandidate>, bool, usize)> {
        let limit = limit.min(MAX_LOAD_MORE_LIMIT);
        let mut entries = self.entries.lock().await;
        let key = normalize(query);
        let entry = entries.get(&key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            entries.remove(&key);
            return None;
        }
        let entry = entries.get(&key)?;
        let page: Vec<FusedCandidate> = entry.cases.iter().skip(offset).take(limit).cloned().collect();
        let has_more = offset + page.len() < entry.cases.len();
        let returned_count = page.len();
        Some((page, has_more, returned_count))
    }
}

impl Default for PaginationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use law_core::Strategy;

    fn candidate(id: &str) -> FusedCandidate {
        FusedCandidate { doc_id: id.to_string(), score: 0.5, sources: vec![Strategy::BasicSemantic], confidence: 1.0 }
    }

    #[tokio::test]
    async fn page_reuses_cached_list_without_rerunning_pipeline() {
        let cache = PaginationCache::default();
        cache.put("盗窃罪", vec![candidate("case_1"), candidate("case_2"), candidate("case_3")]).await;

        let (page, has_more, count) = cache.page("盗窃罪", 0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(has_more);
        assert_eq!(count, 2);

        let (page2, has_more2, _) = cache.page("盗窃罪", 2, 2).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert!(!has_more2);
    }

    #[tokio::test]
    async fn unknown_query_returns_none() {
        let cache = PaginationCache::default();
        assert!(cache.page("从未检索过的问题", 0, 10).await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_a_miss() {
        let cache = PaginationCache::new(Duration::from_millis(1));
        cache.put("盗窃罪", vec![candidate("case_1")]).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.page("盗窃罪", 0, 10).await.is_none());
    }

    #[tokio::test]
    async fn limit_is_capped_at_ten() {
        let cache = PaginationCache::default();
        let many: Vec<FusedCandidate> = (0..20).map(|i| candidate(&format!("case_{i}"))).collect();
        cache.put("q", many).await;
        let (page, _, _) = cache.page("q", 0, 50).await.unwrap();
        assert_eq!(page.len(), MAX_LOAD_MORE_LIMIT);
    }
}
