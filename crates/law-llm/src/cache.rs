use std::num::NonZeroUsize;

use lru::LruCache;

/// `(prompt, model, temperature, max_tokens)` identifies a cacheable call (§3, §4.5).
/// `temperature` is bucketed to three decimal places (`temperature_milli`) so floating
/// noise doesn't fragment the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prompt: String,
    pub model: String,
    pub temperature_milli: u32,
    pub max_tokens: u32,
}

impl CacheKey {
    pub fn new(prompt: &str, model: &str, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.to_string(),
            model: model.to_string(),
            temperature_milli: (temperature * 1000.0).round() as u32,
            max_tokens,
        }
    }
}

/// Process-wide LRU cache of generated completions. Bounded, oldest-first eviction
/// (§4.5) — exactly `lru::LruCache`'s default behavior.
#[derive(Debug)]
pub struct ResponseCache {
    inner: LruCache<CacheKey, String>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self { inner: LruCache::new(cap) }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn put(&mut self, key: CacheKey, value: String) {
        self.inner.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
