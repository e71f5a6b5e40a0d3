// libs/infra/broker/src/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("[BROKER_CONFIG_FAULT]: producer configuration invalid -> {0}")]
    ConfigurationError(String),

    #[error("[BROKER_PUBLISH_FAULT]: publish failed -> {0}")]
    PublishError(String),

    #[error("[BROKER_SERIALIZATION_FAULT]: envelope serialization failed -> {0}")]
    SerializationError(#[from] serde_json::Error),
}
