//! The transactional outbox dispatcher: a background loop draining
//! unpublished events to the broker with retry, DLQ escalation, and a
//! consecutive-failure circuit breaker.

pub mod config;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use paygate_infra_broker::{dlq_topic, topic_for_event, DeadLetterEnvelope, EventEnvelope, Publisher};
use paygate_infra_db::errors::DbError;
use paygate_infra_db::unit_of_work::UnitOfWork;
use paygate_domain_models::OutboxEvent;
use rand::Rng;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

pub use config::DispatcherConfig;

/// Runs the outbox dispatcher's polling loop. Shared by the HTTP front
/// door (spawned as an in-process task) and the standalone worker
/// binary. Generic over the publisher so tests can substitute an
/// in-process fake for the real broker client.
pub struct OutboxDispatcher {
    pool: PgPool,
    producer: Arc<dyn Publisher>,
    config: DispatcherConfig,
    running: Arc<AtomicBool>,
}

impl OutboxDispatcher {
    pub fn new(pool: PgPool, producer: Arc<dyn Publisher>, config: DispatcherConfig) -> Self {
        Self {
            pool,
            producer,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A clone-able handle that can flip `running` to false from outside
    /// the loop (e.g. a signal handler).
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Runs until `shutdown_handle` is set to `false` or the circuit
    /// breaker trips. Double-stop (calling this again after it has
    /// already returned) is a no-op because `running` is only ever set
    /// once at the top of this call.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!(batch_size = self.config.batch_size, "outbox dispatcher started");

        let mut consecutive_failures: u32 = 0;

        while self.running.load(Ordering::SeqCst) {
            match self.process_batch().await {
                Ok(processed) => {
                    consecutive_failures = 0;
                    if processed == 0 {
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                }
                Err(error) => {
                    consecutive_failures += 1;
                    error!(
                        %error,
                        consecutive_failures,
                        "outbox processing error"
                    );
                    if consecutive_failures >= self.config.consecutive_failure_threshold {
                        error!(
                            consecutive_failures,
                            "circuit breaker triggered, stopping dispatcher"
                        );
                        break;
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("outbox dispatcher stopped");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// One poll iteration: read a batch, publish or DLQ each event,
    /// mark successes published, and commit. Returns the number of
    /// events read (zero means the caller should sleep for the poll
    /// interval). Public so integration tests can drive a single
    /// iteration deterministically instead of racing `run`'s loop.
    pub async fn process_batch(&self) -> Result<usize, DbError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let events = uow.outbox().get_unpublished(self.config.batch_size).await?;

        if events.is_empty() {
            uow.commit().await?;
            return Ok(0);
        }

        let mut published_ids: Vec<String> = Vec::new();
        let mut dlq_published_ids: Vec<String> = Vec::new();

        for event in &events {
            if event.retry_count >= self.config.max_retries {
                if self.publish_to_dlq(event).await {
                    dlq_published_ids.push(event.id.clone());
                } else {
                    warn!(event_id = %event.id, "dlq publish failed, will retry next poll");
                }
                continue;
            }

            if self.publish_normal(event).await {
                published_ids.push(event.id.clone());
            } else {
                uow.outbox().increment_retry_count(&event.id).await?;
                let delay = backoff_delay(
                    event.retry_count,
                    self.config.base_delay,
                    self.config.max_delay,
                );
                warn!(
                    event_id = %event.id,
                    retry_count = event.retry_count + 1,
                    next_delay_seconds = delay,
                    "event publish failed, retry scheduled"
                );
            }
        }

        published_ids.extend(dlq_published_ids);
        uow.outbox().mark_published(&published_ids).await?;
        uow.commit().await?;

        info!(processed = events.len(), published = published_ids.len(), "batch processed");
        Ok(events.len())
    }

    async fn publish_normal(&self, event: &OutboxEvent) -> bool {
        let topic = topic_for_event(&self.config.topic_prefix, &event.event_type);
        let envelope = EventEnvelope {
            event_id: event.id.clone(),
            aggregate_type: event.aggregate_type.clone(),
            aggregate_id: event.aggregate_id.clone(),
            event_type: event.event_type.clone(),
            payload: event.payload.clone(),
            timestamp: event.created_at,
        };
        let payload = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(event_id = %event.id, %error, "event envelope serialization failed");
                return false;
            }
        };
        match self.producer.publish(&topic, &event.aggregate_id, &payload).await {
            Ok(()) => {
                info!(event_id = %event.id, topic = %topic, "event published");
                true
            }
            Err(error) => {
                warn!(event_id = %event.id, %error, "event publish failed");
                false
            }
        }
    }

    async fn publish_to_dlq(&self, event: &OutboxEvent) -> bool {
        let topic = dlq_topic(&self.config.topic_prefix);
        let envelope = DeadLetterEnvelope {
            envelope: EventEnvelope {
                event_id: event.id.clone(),
                aggregate_type: event.aggregate_type.clone(),
                aggregate_id: event.aggregate_id.clone(),
                event_type: event.event_type.clone(),
                payload: event.payload.clone(),
                timestamp: event.created_at,
            },
            retry_count: event.retry_count,
            failed_at: Utc::now(),
            error: "max_retries_exceeded".to_string(),
        };
        let payload = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(error) => {
                error!(event_id = %event.id, %error, "dlq envelope serialization failed");
                return false;
            }
        };
        match self.producer.publish(&topic, &event.aggregate_id, &payload).await {
            Ok(()) => {
                warn!(event_id = %event.id, "event sent to dlq");
                true
            }
            Err(error) => {
                error!(event_id = %event.id, %error, "dlq publish failed");
                false
            }
        }
    }
}

fn backoff_delay(retry_count: i32, base_delay: std::time::Duration, max_delay: std::time::Duration) -> f64 {
    let base = base_delay.as_secs_f64();
    let max = max_delay.as_secs_f64();
    let delay = (base * 2f64.powi(retry_count)).min(max);
    let jitter = rand::thread_rng().gen_range(0.0..(delay * 0.10).max(f64::EPSILON));
    delay + jitter
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn backoff_never_exceeds_max_plus_ten_percent_jitter() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);
        for retry_count in 0..20 {
            let delay = backoff_delay(retry_count, base, max);
            assert!(delay <= 60.0 * 1.10 + 0.001);
            assert!(delay >= 0.0);
        }
    }

    #[test]
    fn backoff_grows_with_retry_count_before_capping() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);
        let early = backoff_delay(0, base, max);
        let later = backoff_delay(3, base, max);
        assert!(later > early);
    }
}
