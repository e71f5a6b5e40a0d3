pub mod envelope;
pub mod errors;
pub mod producer;
pub mod publisher;

pub use envelope::{dlq_topic, topic_for_event, DeadLetterEnvelope, EventEnvelope};
pub use errors::BrokerError;
pub use producer::EventProducer;
pub use publisher::Publisher;
