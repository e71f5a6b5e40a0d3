// libs/infra/broker/src/producer.rs
//
// Wraps an rdkafka FutureProducer configured for idempotent,
// all-acks-required publishing: from the producer's perspective, a
// retried publish within one producer session deduplicates, which is
// the exactly-once guarantee the dispatcher's retry loop depends on.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tracing::{instrument, warn};

use crate::errors::BrokerError;
use crate::publisher::Publisher;

pub struct EventProducer {
    inner: FutureProducer,
    publish_timeout: Duration,
}

impl EventProducer {
    pub fn new(bootstrap_servers: &str, publish_timeout: Duration) -> Result<Self, BrokerError> {
        let inner = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("message.timeout.ms", publish_timeout.as_millis().to_string())
            .create()
            .map_err(|e| BrokerError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            inner,
            publish_timeout,
        })
    }
}

#[async_trait]
impl Publisher for EventProducer {
    /// An expired publish (the broker never acknowledges within
    /// `publish_timeout`) is surfaced as a `BrokerError::PublishError`,
    /// which the dispatcher treats as a failure on the retry path.
    #[instrument(skip(self, payload), fields(topic = %topic, key = %key))]
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .inner
            .send(record, Timeout::After(self.publish_timeout))
            .await
        {
            Ok(_delivery) => Ok(()),
            Err((kafka_error, _owned_message)) => {
                warn!(error = %kafka_error, "publish failed");
                Err(BrokerError::PublishError(kafka_error.to_string()))
            }
        }
    }
}
