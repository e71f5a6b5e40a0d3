// apps/payments-api/src/config.rs

use std::time::Duration;

/// Process-wide settings, loaded once at startup from the environment.
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub kafka_brokers: String,
    pub rpc_port: u16,
    pub metrics_port: u16,

    pub outbox_batch_size: i64,
    pub outbox_poll_interval: Duration,
    pub outbox_max_retries: i32,
    pub outbox_base_delay: Duration,
    pub outbox_max_delay: Duration,
    pub topic_prefix: String,

    pub rate_limit_enabled: bool,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,

    pub idempotency_gc_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database_url: env_var("DATABASE_URL", "postgres://localhost/paygate"),
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
            redis_url: env_var("REDIS_URL", "redis://localhost:6379"),
            kafka_brokers: env_var("KAFKA_BROKERS", "localhost:9092"),
            rpc_port: env_parse("RPC_PORT", 8080),
            metrics_port: env_parse("METRICS_PORT", 9090),

            outbox_batch_size: env_parse("OUTBOX_BATCH_SIZE", 100),
            outbox_poll_interval: Duration::from_secs_f64(env_parse(
                "OUTBOX_POLL_INTERVAL_SECONDS",
                1.0,
            )),
            outbox_max_retries: env_parse("OUTBOX_MAX_RETRIES", 5),
            outbox_base_delay: Duration::from_secs_f64(env_parse(
                "OUTBOX_BASE_DELAY_SECONDS",
                1.0,
            )),
            outbox_max_delay: Duration::from_secs_f64(env_parse("OUTBOX_MAX_DELAY_SECONDS", 60.0)),
            topic_prefix: env_var("KAFKA_TOPIC_PREFIX", "payments"),

            rate_limit_enabled: env_parse("RATE_LIMIT_ENABLED", true),
            rate_limit_max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window_seconds: env_parse("RATE_LIMIT_WINDOW_SECONDS", 60),

            idempotency_gc_interval: Duration::from_secs(env_parse(
                "IDEMPOTENCY_GC_INTERVAL_SECONDS",
                3600,
            )),
        }
    }
}

fn env_var(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
