// libs/infra/broker/src/publisher.rs
//
// The seam between the dispatcher and whatever actually moves bytes to
// a topic. `EventProducer` is the real Kafka-backed implementation;
// tests substitute an in-process fake so the dispatcher's retry/DLQ/
// circuit-breaker logic is exercised without a live broker.

use async_trait::async_trait;

use crate::errors::BrokerError;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes an already-serialized payload to `topic`, partitioned
    /// by `key`.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), BrokerError>;
}
