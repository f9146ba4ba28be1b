use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Row};

use warden_core::{Clock, RateLimitError, RateLimiter};

/// Shared fixed-window counters persisted in the `rate_limits` table.
///
/// Stale rows past the window are purged before counting, and the allow
/// decision is made on the post-increment count returned by the upsert, so
/// concurrent consumers for the same key cannot all slip under the limit.
pub struct PostgresRateLimiter {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresRateLimiter {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl RateLimiter for PostgresRateLimiter {
    #[tracing::instrument(name = "Consuming persisted rate limit", skip_all)]
    async fn consume(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<bool, RateLimitError> {
        let now = self.clock.now();
        let stale_before = now - Duration::seconds(window_seconds as i64);

        sqlx::query("DELETE FROM rate_limits WHERE key = $1 AND window_start < $2")
            .bind(key)
            .bind(stale_before)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        // The window stays anchored at its first request; the conflict arm
        // only bumps the counter.
        let row = sqlx::query(
            r#"
                INSERT INTO rate_limits (key, window_start, count)
                VALUES ($1, $2, 1)
                ON CONFLICT (key) DO UPDATE SET count = rate_limits.count + 1
                RETURNING count
            "#,
        )
        .bind(key)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        let count: i32 = row.try_get("count").map_err(unexpected)?;
        Ok(count as u32 <= limit)
    }
}

fn unexpected(e: sqlx::Error) -> RateLimitError {
    RateLimitError::Unexpected(e.to_string())
}
