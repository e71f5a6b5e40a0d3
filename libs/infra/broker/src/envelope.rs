// libs/infra/broker/src/envelope.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The canonical payload published to the broker for a normal event.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event_id: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

/// The envelope published to the dead-letter topic: a normal envelope
/// plus the three fields that describe why it ended up there.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterEnvelope {
    #[serde(flatten)]
    pub envelope: EventEnvelope,
    pub retry_count: i32,
    pub failed_at: DateTime<Utc>,
    pub error: String,
}

/// `<prefix>.<event_type lowercased>` for normal events.
pub fn topic_for_event(prefix: &str, event_type: &str) -> String {
    format!("{prefix}.{}", event_type.to_lowercase())
}

/// `<prefix>.dlq` for dead-letter emissions.
pub fn dlq_topic(prefix: &str) -> String {
    format!("{prefix}.dlq")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_topic_lowercases_event_type() {
        assert_eq!(
            topic_for_event("payments", "PaymentAuthorized"),
            "payments.paymentauthorized"
        );
    }

    #[test]
    fn dlq_topic_is_prefix_dot_dlq() {
        assert_eq!(dlq_topic("payments"), "payments.dlq");
    }
}
