// libs/infra/db/src/errors.rs

use paygate_domain_models::DomainError;
use thiserror::Error;

/// Errors that can terminate an `authorize` call before it reaches a
/// decision. Every variant here is fatal: the transaction rolls back, the
/// idempotency record is left PENDING for a later retry, and the caller
/// sees an internal error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// The post-lock re-check in step 5 of the authorization algorithm
    /// found the payer balance had drained between the pre-lock snapshot
    /// and lock acquisition. This is a serialization anomaly, not a
    /// decline: the pre-lock decline path already handles the ordinary
    /// insufficient-funds case.
    #[error("serialization anomaly: {0}")]
    SerializationAnomaly(DomainError),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("[DB_NET_FAULT]: connection to Postgres failed -> {0}")]
    ConnectionError(String),

    #[error("[DB_CONFIG_FAULT]: database configuration invalid -> {0}")]
    ConfigurationError(String),

    #[error("[DB_QUERY_FAULT]: query rejected -> {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("[DB_MAPPING_FAULT]: row mapping failed -> {0}")]
    MappingError(String),

    #[error("optimistic lock conflict on {entity} {entity_id}")]
    OptimisticLock { entity: String, entity_id: String },
}
