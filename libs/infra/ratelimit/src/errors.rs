// libs/infra/ratelimit/src/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("[RATELIMIT_CONN_FAULT]: redis connection failed -> {0}")]
    ConnectionError(String),

    #[error("[RATELIMIT_QUERY_FAULT]: pipeline execution failed -> {0}")]
    QueryError(#[from] redis::RedisError),
}
