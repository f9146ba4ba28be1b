use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use warden_core::{Clock, RateLimitError, RateLimiter};

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Process-local fixed-window counters.
///
/// Counters reset on the first consume after the window has elapsed and are
/// lost on restart, which under-counts across restarts; acceptable for the
/// non-shared deployments this strategy is meant for. Per-key updates happen
/// under the map's shard lock, so concurrent consumers of one key serialize.
pub struct LocalRateLimiter {
    windows: DashMap<String, Window>,
    clock: Arc<dyn Clock>,
}

impl LocalRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }
}

#[async_trait]
impl RateLimiter for LocalRateLimiter {
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<bool, RateLimitError> {
        let now = self.clock.now();
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now - window.started_at >= Duration::seconds(window_seconds as i64) {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= limit {
            return Ok(false);
        }
        window.count += 1;
        Ok(true)
    }
}
