use chrono::{DateTime, Utc};

/// Per-day request/token/cost tally with an 80% warning threshold and a 100% hard stop
/// (§4.5). Resets when the wall-clock day rolls over.
#[derive(Debug, Clone)]
pub struct Budget {
    daily_limit_usd: f64,
    day: DateTime<Utc>,
    requests: u64,
    tokens: u64,
    cost_usd: f64,
}

/// Snapshot handed to callers/observability; not part of the hot path.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BudgetSnapshot {
    pub requests: u64,
    pub tokens: u64,
    pub cost_usd: f64,
    pub daily_limit_usd: f64,
    pub fraction_used: f64,
}

/// USD per 1K tokens; a flat estimate, not per-model pricing.
const COST_PER_1K_TOKENS_USD: f64 = 0.002;

impl Budget {
    pub fn new(daily_limit_usd: f64, now: DateTime<Utc>) -> Self {
        Self {
            daily_limit_usd,
            day: now,
            requests: 0,
            tokens: 0,
            cost_usd: 0.0,
        }
    }

    fn roll_if_new_day(&mut self, now: DateTime<Utc>) {
        if now.date_naive() != self.day.date_naive() {
            self.requests = 0;
            self.tokens = 0;
            self.cost_usd = 0.0;
            self.day = now;
        }
    }

    /// `true` once spend has reached 100% of the daily budget; callers must refuse
    /// further calls (§4.5).
    pub fn is_exhausted(&mut self, now: DateTime<Utc>) -> bool {
        self.roll_if_new_day(now);
        self.daily_limit_usd > 0.0 && self.cost_usd >= self.daily_limit_usd
    }

    /// `true` once spend has crossed 80%; callers should raise a non-fatal warning but
    /// keep serving (§4.5).
    pub fn is_near_limit(&mut self, now: DateTime<Utc>) -> bool {
        self.roll_if_new_day(now);
        self.daily_limit_usd > 0.0 && self.cost_usd >= 0.8 * self.daily_limit_usd
    }

    pub fn record(&mut self, now: DateTime<Utc>, tokens: u64) {
        self.roll_if_new_day(now);
        self.requests += 1;
        self.tokens += tokens;
        self.cost_usd += (tokens as f64 / 1000.0) * COST_PER_1K_TOKENS_USD;
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        let fraction_used = if self.daily_limit_usd > 0.0 {
            self.cost_usd / self.daily_limit_usd
        } else {
            0.0
        };
        BudgetSnapshot {
            requests: self.requests,
            tokens: self.tokens,
            cost_usd: self.cost_usd,
            daily_limit_usd: self.daily_limit_usd,
            fraction_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 28, hour, 0, 0).unwrap()
    }

    #[test]
    fn near_limit_flips_at_80_percent() {
        let mut b = Budget::new(1.0, ts(0));
        // 1.0 USD budget / 0.002 per 1k tokens = 500k tokens total; 80% = 400k tokens.
        b.record(ts(1), 400_000);
        assert!(b.is_near_limit(ts(1)));
        assert!(!b.is_exhausted(ts(1)));
    }

    #[test]
    fn exhausted_at_100_percent() {
        let mut b = Budget::new(1.0, ts(0));
        b.record(ts(1), 500_000);
        assert!(b.is_exhausted(ts(1)));
    }

    #[test]
    fn resets_on_new_day() {
        let mut b = Budget::new(1.0, ts(0));
        b.record(ts(1), 500_000);
        assert!(b.is_exhausted(ts(1)));
        let next_day = ts(1) + chrono::Duration::days(1);
        assert!(!b.is_exhausted(next_day));
    }

    #[test]
    fn zero_limit_never_exhausts() {
        let mut b = Budget::new(0.0, ts(0));
        b.record(ts(0), 1_000_000);
        assert!(!b.is_exhausted(ts(0)));
    }
}
