//! Spacing of outbound generator calls and request accounting.
//!
//! Only the service layer calls into this; parsing and graph building never
//! wait on it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug)]
struct LimiterState {
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
    requests: u64,
}

/// Enforces a minimum interval between requests.
///
/// `acquire` reserves a slot under the lock and sleeps after releasing it,
/// so concurrent callers queue up one interval apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    daily_limit: u64,
    state: Mutex<LimiterState>,
}

/// Usage report for the `/api/usage` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub requests_today: u64,
    pub daily_limit: u64,
    pub remaining_today: u64,
    pub model: String,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, daily_limit: u64) -> Self {
        Self {
            min_interval,
            daily_limit,
            state: Mutex::new(LimiterState {
                next_slot: None,
                requests: 0,
            }),
        }
    }

    /// Reserve the next slot, block until it arrives, and count the request.
    /// Returns the time spent waiting.
    pub fn acquire(&self) -> Duration {
        let wait = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let now = Instant::now();
            let start = match state.next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            state.next_slot = Some(start + self.min_interval);
            state.requests += 1;
            start - now
        };

        if !wait.is_zero() {
            tracing::warn!(wait_secs = wait.as_secs_f64(), "waiting for rate limit");
            std::thread::sleep(wait);
        }
        wait
    }

    pub fn request_count(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).requests
    }

    pub fn usage(&self, model: &str) -> UsageStats {
        let requests = self.request_count();
        UsageStats {
            requests_today: requests,
            daily_limit: self.daily_limit,
            remaining_today: self.daily_limit.saturating_sub(requests),
            model: model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO, 10);
        for _ in 0..5 {
            assert_eq!(limiter.acquire(), Duration::ZERO);
        }
        assert_eq!(limiter.request_count(), 5);
    }

    #[test]
    fn second_request_waits_for_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(40), 10);
        assert_eq!(limiter.acquire(), Duration::ZERO);
        let started = Instant::now();
        let waited = limiter.acquire();
        assert!(waited > Duration::ZERO);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn concurrent_callers_are_spaced() {
        let limiter = std::sync::Arc::new(RateLimiter::new(Duration::from_millis(20), 100));
        let started = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = std::sync::Arc::clone(&limiter);
                std::thread::spawn(move || limiter.acquire())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // Three slots: 0ms, 20ms, 40ms.
        assert!(started.elapsed() >= Duration::from_millis(35));
        assert_eq!(limiter.request_count(), 3);
    }

    #[test]
    fn usage_reports_remaining() {
        let limiter = RateLimiter::new(Duration::ZERO, 3);
        limiter.acquire();
        let usage = limiter.usage("gemini-2.5-flash");
        assert_eq!(usage.requests_today, 1);
        assert_eq!(usage.remaining_today, 2);
        assert_eq!(usage.model, "gemini-2.5-flash");
    }
}
