//! In-process fixed-window rate limiter for authentication endpoints
//!
//! One counter per key. The first request opens a window of `window_seconds`;
//! every request inside it increments the counter and is allowed while the
//! counter stays within `max_requests`. The first request after the window
//! ends opens a new one. Bursts straddling a boundary can therefore reach
//! twice the nominal rate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;

use ks_core::services::auth::{RateLimitDecision, RateLimiter};
use ks_core::{Clock, DomainError};
use ks_shared::WindowLimit;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// DashMap-backed implementation of the rate limiter trait
pub struct InMemoryRateLimiter {
    windows: DashMap<String, WindowEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    /// Create a new rate limiter reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    /// Number of tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drop windows that have already ended
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, entry| entry.reset_at > now);
        before - self.windows.len()
    }

    /// Purge ended windows every `every` on a background task
    pub fn start_purge_task(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(interval_secs = every.as_secs(), "Rate limiter purge task started");
            let mut timer = tokio::time::interval(every);
            loop {
                timer.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = self.tracked_keys(), "Purged rate limit windows");
                }
            }
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, key: &str, limit: WindowLimit) -> Result<RateLimitDecision, DomainError> {
        let now = self.clock.now();
        let window = Duration::seconds(limit.window_seconds as i64);

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(WindowEntry {
                count: 0,
                reset_at: now + window,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }
        entry.count = entry.count.saturating_add(1);

        let allowed = entry.count <= limit.max_requests;
        if !allowed {
            tracing::warn!(
                key = key,
                count = entry.count,
                limit = limit.max_requests,
                "Rate limit exceeded"
            );
        }

        Ok(RateLimitDecision {
            allowed,
            remaining: limit.max_requests.saturating_sub(entry.count),
            reset_at: entry.reset_at,
        })
    }
}
