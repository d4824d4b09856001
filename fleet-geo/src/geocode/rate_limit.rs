//! Minimum-spacing rate limiter for outbound provider calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Spaces calls at least `min_interval` apart.
///
/// One shared "last call" timestamp; callers queue on the lock, so the
/// spacing holds under concurrency too. Process-local only: separate
/// instances of the service each get their own budget.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until a call is allowed, then claim the slot.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                trace!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "rate limited");
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}
