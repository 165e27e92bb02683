//! Uniform latency floor for failed authentication
//!
//! Every failed login is held until a fixed minimum has elapsed since the
//! request started, so "no such user", "wrong password" and "locked" answer in
//! the same envelope as each other and as a bcrypt-backed success.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct LatencyFloor {
    minimum: Duration,
}

impl LatencyFloor {
    pub fn new(minimum: Duration) -> Self {
        Self { minimum }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Time still to wait for a request that started at `started`
    pub fn remaining(&self, started: Instant) -> Duration {
        self.minimum.saturating_sub(started.elapsed())
    }

    /// Sleeps until `minimum` has passed since `started`
    pub async fn pad(&self, started: Instant) {
        let remaining = self.remaining(started);
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
    }
}
