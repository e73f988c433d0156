//! Outbound request limiter for data providers.
//!
//! Enforces a minimum delay between requests and a request budget per rolling
//! window (default: 2 seconds and 1800 requests per hour). One limiter is shared
//! through `Arc` by every provider that talks to the same upstream.

use super::provider::DataError;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_REQUESTS_PER_HOUR: u32 = 1800;
const HOUR: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct LimiterState {
    last_request: Option<Instant>,
    request_count: u32,
    window_start: Instant,
}

/// Snapshot of limiter counters for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestStats {
    pub requests_this_window: u32,
    pub window_elapsed_secs: f64,
    /// Requests per hour extrapolated from the current window.
    pub requests_per_hour_rate: f64,
    pub secs_since_last_request: Option<f64>,
}

#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
    min_delay: Duration,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(min_delay: Duration, max_requests_per_hour: u32) -> Self {
        Self::with_window(min_delay, max_requests_per_hour, HOUR)
    }

    pub fn with_window(min_delay: Duration, max_requests: u32, window: Duration) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                last_request: None,
                request_count: 0,
                window_start: Instant::now(),
            }),
            min_delay,
            max_requests,
            window,
        }
    }

    /// 2 seconds between requests, 1800 requests per hour.
    pub fn default_provider() -> Self {
        Self::new(DEFAULT_REQUEST_DELAY, DEFAULT_MAX_REQUESTS_PER_HOUR)
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn roll_window(&self, state: &mut LimiterState, now: Instant) {
        if now.duration_since(state.window_start) >= self.window {
            state.request_count = 0;
            state.window_start = now;
        }
    }

    /// Wait out the minimum delay and record a request.
    ///
    /// Holding the lock while sleeping serializes callers, so concurrent fetches
    /// are spaced by `min_delay` as well. Fails without waiting when the window
    /// budget is spent.
    pub fn acquire(&self) -> Result<(), DataError> {
        let mut state = self.lock();
        let now = Instant::now();
        self.roll_window(&mut state, now);

        if state.request_count >= self.max_requests {
            let remaining = self
                .window
                .saturating_sub(now.duration_since(state.window_start));
            return Err(DataError::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        if let Some(last) = state.last_request {
            let since = now.duration_since(last);
            if since < self.min_delay {
                let wait = self.min_delay - since;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
                std::thread::sleep(wait);
            }
        }

        state.last_request = Some(Instant::now());
        state.request_count += 1;
        Ok(())
    }

    /// True while the window budget has room.
    pub fn is_available(&self) -> bool {
        let mut state = self.lock();
        self.roll_window(&mut state, Instant::now());
        state.request_count < self.max_requests
    }

    pub fn stats(&self) -> RequestStats {
        let state = self.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(state.window_start).as_secs_f64();
        let rate = if elapsed > 0.0 {
            state.request_count as f64 / elapsed * 3600.0
        } else {
            0.0
        };
        RequestStats {
            requests_this_window: state.request_count,
            window_elapsed_secs: elapsed,
            requests_per_hour_rate: rate,
            secs_since_last_request: state
                .last_request
                .map(|last| now.duration_since(last).as_secs_f64()),
        }
    }
}
