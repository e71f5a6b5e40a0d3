//! Sliding-window rate limiting backed by a remote sorted set.
//!
//! Each identifier gets its own sorted set at key `<prefix><identifier>`,
//! scored by request timestamp. Admission is decided by a single atomic
//! pipeline so concurrent callers never observe a torn read between the
//! cardinality check and the member insert.

pub mod errors;

use std::time::{SystemTime, UNIX_EPOCH};

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::instrument;

pub use errors::RateLimitError;

pub struct SlidingWindowRateLimiter {
    connection: ConnectionManager,
    max_requests: u32,
    window_seconds: u64,
    key_prefix: String,
}

impl SlidingWindowRateLimiter {
    pub async fn connect(
        redis_url: &str,
        max_requests: u32,
        window_seconds: u64,
        key_prefix: impl Into<String>,
    ) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| RateLimitError::ConnectionError(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| RateLimitError::ConnectionError(e.to_string()))?;
        Ok(Self {
            connection,
            max_requests,
            window_seconds,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}{}", self.key_prefix, identifier)
    }

    /// Runs the four-step sliding-window pipeline and returns
    /// `(allowed, remaining)`. Admits a microscopic race where a denied
    /// request still consumes a slot for `window_seconds` — a documented
    /// trade-off of running this as one pipeline instead of two.
    #[instrument(skip(self), fields(identifier = %identifier))]
    pub async fn is_allowed(&self, identifier: &str) -> Result<(bool, u32), RateLimitError> {
        let key = self.key(identifier);
        let now = now_seconds();
        let window_start = now - self.window_seconds as f64;

        let mut connection = self.connection.clone();
        let (cardinality_before,): (u32,) = redis::pipe()
            .atomic()
            .zrembyscore(&key, 0, window_start)
            .ignore()
            .zcard(&key)
            .zadd(&key, now.to_string(), now)
            .ignore()
            .expire(&key, self.window_seconds as i64)
            .ignore()
            .query_async(&mut connection)
            .await?;

        let allowed = cardinality_before < self.max_requests;
        let remaining = self
            .max_requests
            .saturating_sub(cardinality_before)
            .saturating_sub(1);
        Ok((allowed, remaining))
    }

    /// Reports remaining capacity without admitting anything.
    #[instrument(skip(self), fields(identifier = %identifier))]
    pub async fn get_remaining(&self, identifier: &str) -> Result<u32, RateLimitError> {
        let key = self.key(identifier);
        let now = now_seconds();
        let window_start = now - self.window_seconds as f64;

        let mut connection = self.connection.clone();
        let _: () = connection.zrembyscore(&key, 0, window_start).await?;
        let cardinality: u32 = connection.zcard(&key).await?;
        Ok(self.max_requests.saturating_sub(cardinality))
    }
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs_f64()
}
