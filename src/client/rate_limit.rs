//! Process-wide pacing of upstream calls.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a minimum spacing between consecutive upstream calls.
///
/// Clones share the same pacing state. The lock is held while waiting, so
/// concurrent callers are admitted one at a time, each at least
/// `min_interval` after the previous one.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Limiter admitting at most `calls` per second.
    pub fn per_second(calls: u32) -> Self {
        Self::new(Duration::from_secs(1) / calls.max(1))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call may be issued, then record it as issued now.
    ///
    /// Returns the instant recorded for this call.
    pub async fn acquire(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limit: waiting {:?} before next request", wait);
                sleep(wait).await;
            }
        }

        let now = Instant::now();
        *last_call = Some(now);
        now
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(5)
    }
}
