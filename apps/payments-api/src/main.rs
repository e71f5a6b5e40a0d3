// [apps/payments-api/src/main.rs]

mod config;
mod error;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use paygate_core_ids::IdGenerator;
use paygate_infra_broker::{EventProducer, Publisher};
use paygate_infra_db::unit_of_work::UnitOfWork;
use paygate_infra_dispatcher::{DispatcherConfig, OutboxDispatcher};
use paygate_infra_ratelimit::SlidingWindowRateLimiter;
use paygate_shared_telemetry::init_tracing;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use config::Settings;
use state::AppState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("payments-api");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let settings = Arc::new(Settings::from_env());

        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect(&settings.database_url)
            .await
            .expect("failed to connect to database");

        paygate_infra_db::schema::apply_schema(&pool)
            .await
            .expect("failed to apply schema");

        let ids = Arc::new(IdGenerator::default());

        let producer: Arc<dyn Publisher> = Arc::new(
            EventProducer::new(&settings.kafka_brokers, Duration::from_secs(10))
                .expect("failed to construct kafka producer"),
        );

        let dispatcher_config = DispatcherConfig {
            batch_size: settings.outbox_batch_size,
            poll_interval: settings.outbox_poll_interval,
            max_retries: settings.outbox_max_retries,
            base_delay: settings.outbox_base_delay,
            max_delay: settings.outbox_max_delay,
            consecutive_failure_threshold: DispatcherConfig::default().consecutive_failure_threshold,
            topic_prefix: settings.topic_prefix.clone(),
        };
        let dispatcher = Arc::new(OutboxDispatcher::new(pool.clone(), producer, dispatcher_config));

        let dispatcher_handle = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher_handle.run().await;
        });

        let rate_limiter = if settings.rate_limit_enabled {
            match SlidingWindowRateLimiter::connect(
                &settings.redis_url,
                settings.rate_limit_max_requests,
                settings.rate_limit_window_seconds,
                "paygate:ratelimit:",
            )
            .await
            {
                Ok(limiter) => Some(Arc::new(limiter)),
                Err(error) => {
                    warn!(%error, "rate limiter unavailable at startup, requests will be admitted");
                    None
                }
            }
        } else {
            None
        };

        spawn_idempotency_gc(pool.clone(), settings.idempotency_gc_interval);

        let state = AppState {
            pool,
            ids,
            rate_limiter,
            dispatcher,
            settings: settings.clone(),
        };

        let router = routes::build_router(state);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.rpc_port))
            .await
            .expect("failed to bind rpc port");

        info!(port = settings.rpc_port, "payments-api listening");
        axum::serve(listener, router)
            .await
            .expect("server error");
    });

    Ok(())
}

/// Periodically purges expired idempotency records so the table doesn't
/// grow unbounded. Runs for the lifetime of the process; a failed sweep
/// is logged and retried on the next tick rather than aborting the loop.
fn spawn_idempotency_gc(pool: sqlx::PgPool, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let outcome = async {
                let mut uow = UnitOfWork::begin(&pool).await?;
                let removed = uow.idempotency().delete_expired().await?;
                uow.commit().await?;
                Ok::<u64, paygate_infra_db::errors::DbError>(removed)
            }
            .await;

            match outcome {
                Ok(removed) if removed > 0 => info!(removed, "idempotency gc swept expired keys"),
                Ok(_) => {}
                Err(error) => error!(%error, "idempotency gc sweep failed"),
            }
        }
    });
}
