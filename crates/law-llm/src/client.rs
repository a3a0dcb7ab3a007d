use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::budget::{Budget, BudgetSnapshot};
use crate::cache::{CacheKey, ResponseCache};
use crate::error::LlmError;
use crate::provider::LlmProvider;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_CACHE_CAPACITY: usize = 1024;
const BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Persistent primary failure for this long flips the client to fallback-sticky mode
/// (§4.5).
const PRIMARY_FAILURE_WINDOW: Duration = Duration::from_secs(60);
/// How long fallback-sticky mode lasts before the client tries the primary again.
const FALLBACK_STICKY_DURATION: Duration = Duration::from_secs(5 * 60);

/// Rough token estimate (chars / 4) used only for budget accounting, matching
/// `law-rag::context`'s approximate tokenizer convention.
fn estimate_tokens(prompt: &str, max_tokens: u32) -> u64 {
    (prompt.chars().count() as u64 / 4).max(1) + max_tokens as u64
}

#[derive(Debug, Default)]
struct FailoverState {
    primary_failing_since: Option<Instant>,
    sticky_fallback_until: Option<Instant>,
}

/// Capability set `{generate}` with timeout/retry, an LRU response cache, budget
/// enforcement, and primary+fallback provider selection (§4.5). One instance is shared
/// process-wide.
#[derive(Debug)]
pub struct LlmClient {
    primary: Arc<dyn LlmProvider>,
    fallback: Option<Arc<dyn LlmProvider>>,
    cache: Mutex<ResponseCache>,
    budget: Mutex<Budget>,
    failover: Mutex<FailoverState>,
    timeout: Duration,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(primary: Arc<dyn LlmProvider>, fallback: Option<Arc<dyn LlmProvider>>, daily_budget_usd: f64) -> Self {
        Self {
            primary,
            fallback,
            cache: Mutex::new(ResponseCache::new(DEFAULT_CACHE_CAPACITY)),
            budget: Mutex::new(Budget::new(daily_budget_usd, Utc::now())),
            failover: Mutex::new(FailoverState::default()),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn budget_snapshot(&self) -> BudgetSnapshot {
        self.budget.lock().await.snapshot()
    }

    /// Cheap, network-free health check used by the Router's `llm_enhanced` gate
    /// (§4.7): unhealthy once the daily budget is exhausted.
    pub async fn is_healthy(&self) -> bool {
        !self.budget.lock().await.is_exhausted(Utc::now())
    }

    pub async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, LlmError> {
        let now = Utc::now();
        if self.budget.lock().await.is_exhausted(now) {
            return Err(LlmError::BudgetExhausted);
        }
        if self.budget.lock().await.is_near_limit(now) {
            tracing::warn!("LLM daily budget above 80%");
        }

        let key = CacheKey::new(prompt, self.primary.name(), temperature, max_tokens);
        if let Some(cached) = self.cache.lock().await.get(&key) {
            return Ok(cached);
        }

        let use_fallback_first = self.sticky_fallback_active().await;
        let result = if use_fallback_first {
            match &self.fallback {
                Some(fb) => self.call_with_retry(fb.as_ref(), prompt, max_tokens, temperature).await,
                None => self.call_with_retry(self.primary.as_ref(), prompt, max_tokens, temperature).await,
            }
        } else {
            match self.call_with_retry(self.primary.as_ref(), prompt, max_tokens, temperature).await {
                Ok(text) => {
                    self.record_primary_success().await;
                    Ok(text)
                }
                Err(primary_err) => {
                    self.record_primary_failure().await;
                    match &self.fallback {
                        Some(fb) => self.call_with_retry(fb.as_ref(), prompt, max_tokens, temperature).await,
                        None => Err(primary_err),
                    }
                }
            }
        };

        if let Ok(text) = &result {
            self.budget.lock().await.record(now, estimate_tokens(prompt, max_tokens));
            self.cache.lock().await.put(key, text.clone());
        }
        result
    }

    async fn sticky_fallback_active(&self) -> bool {
        let state = self.failover.lock().await;
        match state.sticky_fallback_until {
            Some(until) => Instant::now() < until,
            None => false,
        }
    }

    async fn record_primary_failure(&self) {
        let mut state = self.failover.lock().await;
        let now = Instant::now();
        let failing_since = *state.primary_failing_since.get_or_insert(now);
        if now.duration_since(failing_since) >= PRIMARY_FAILURE_WINDOW {
            state.sticky_fallback_until = Some(now + FALLBACK_STICKY_DURATION);
        }
    }

    async fn record_primary_success(&self) {
        let mut state = self.failover.lock().await;
        state.primary_failing_since = None;
        state.sticky_fallback_until = None;
    }

    async fn call_with_retry(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut attempt = 0u32;
        loop {
            let call = provider.generate(prompt, max_tokens, temperature);
            let outcome = tokio::time::timeout(self.timeout, call)
                .await
                .unwrap_or(Err(LlmError::Timeout));

            match outcome {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let backoff = BACKOFF_BASE * 2u32.pow(attempt);
                    tracing::warn!(provider = provider.name(), attempt, "transient LLM error, retrying: {err}");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FlakyProvider {
        name: String,
        fail_times: AtomicU32,
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, LlmError> {
            if self.fail_times.load(Ordering::SeqCst) > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                Err(LlmError::Request { message: "boom".to_string(), is_timeout: false })
            } else {
                Ok(format!("{}-answer", self.name))
            }
        }
    }

    #[derive(Debug)]
    struct AlwaysFailProvider {
        name: String,
    }

    #[async_trait]
    impl LlmProvider for AlwaysFailProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, LlmError> {
            Err(LlmError::Authentication)
        }
    }

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let primary = Arc::new(FlakyProvider { name: "primary".into(), fail_times: AtomicU32::new(1) });
        let client = LlmClient::new(primary, None, 0.0);
        let result = client.generate("hello", 100, 0.2).await.unwrap();
        assert_eq!(result, "primary-answer");
    }

    #[tokio::test]
    async fn cache_hit_bypasses_provider() {
        let primary = Arc::new(FlakyProvider { name: "primary".into(), fail_times: AtomicU32::new(0) });
        let client = LlmClient::new(primary, None, 0.0);
        let first = client.generate("hello", 100, 0.2).await.unwrap();
        let second = client.generate("hello", 100, 0.2).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails_non_transiently() {
        let primary = Arc::new(AlwaysFailProvider { name: "primary".into() });
        let fallback = Arc::new(FlakyProvider { name: "fallback".into(), fail_times: AtomicU32::new(0) });
        let client = LlmClient::new(primary, Some(fallback), 0.0);
        let result = client.generate("hello", 100, 0.2).await.unwrap();
        assert_eq!(result, "fallback-answer");
    }

    #[tokio::test]
    async fn budget_exhaustion_refuses_calls() {
        let primary = Arc::new(FlakyProvider { name: "primary".into(), fail_times: AtomicU32::new(0) });
        let client = LlmClient::new(primary, None, 0.000001);
        // First call spends past the tiny budget (cache key differs per prompt so this
        // doesn't just hit the cache on the second call).
        client.generate("hello world this is a longer prompt", 1000, 0.2).await.unwrap();
        let err = client.generate("a different prompt entirely", 1000, 0.2).await;
        assert!(matches!(err, Err(LlmError::BudgetExhausted)));
    }
}
