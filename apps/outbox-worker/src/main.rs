// [apps/outbox-worker/src/main.rs]

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use paygate_infra_broker::{EventProducer, Publisher};
use paygate_infra_dispatcher::{DispatcherConfig, OutboxDispatcher};
use paygate_shared_telemetry::init_tracing;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("outbox-worker");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let database_url = env_var("DATABASE_URL", "postgres://localhost/paygate");
        let max_connections: u32 = env_parse("DATABASE_MAX_CONNECTIONS", 5);
        let kafka_brokers = env_var("KAFKA_BROKERS", "localhost:9092");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await
            .expect("failed to connect to database");

        paygate_infra_db::schema::apply_schema(&pool)
            .await
            .expect("failed to apply schema");

        let producer: Arc<dyn Publisher> = Arc::new(
            EventProducer::new(&kafka_brokers, Duration::from_secs(10))
                .expect("failed to construct kafka producer"),
        );

        let config = DispatcherConfig {
            batch_size: env_parse("OUTBOX_BATCH_SIZE", DispatcherConfig::default().batch_size),
            poll_interval: Duration::from_secs_f64(env_parse(
                "OUTBOX_POLL_INTERVAL_SECONDS",
                DispatcherConfig::default().poll_interval.as_secs_f64(),
            )),
            max_retries: env_parse("OUTBOX_MAX_RETRIES", DispatcherConfig::default().max_retries),
            base_delay: Duration::from_secs_f64(env_parse(
                "OUTBOX_BASE_DELAY_SECONDS",
                DispatcherConfig::default().base_delay.as_secs_f64(),
            )),
            max_delay: Duration::from_secs_f64(env_parse(
                "OUTBOX_MAX_DELAY_SECONDS",
                DispatcherConfig::default().max_delay.as_secs_f64(),
            )),
            consecutive_failure_threshold: env_parse(
                "OUTBOX_CONSECUTIVE_FAILURE_THRESHOLD",
                DispatcherConfig::default().consecutive_failure_threshold,
            ),
            topic_prefix: env_var("KAFKA_TOPIC_PREFIX", "payments"),
        };

        let dispatcher = OutboxDispatcher::new(pool, producer, config);
        let shutdown = dispatcher.shutdown_handle();

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, stopping dispatcher");
            shutdown.store(false, std::sync::atomic::Ordering::SeqCst);
        });

        info!("outbox-worker starting");
        dispatcher.run().await;
    });

    Ok(())
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
